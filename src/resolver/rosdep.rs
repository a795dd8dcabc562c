//! rosdep rule database backed by the public rule lists.
//!
//! Rules come from the YAML rule files in the rosdistro repository
//! (base/python/ruby lists). Each entry maps a rosdep name to per-OS rules:
//!
//! ```yaml
//! boost:
//!   alpine: [boost-dev]
//!   ubuntu: libboost-all-dev
//!   fedora:
//!     '22': [boost-devel]
//!     '*': [boost-devel]
//!   osx:
//!     homebrew:
//!       packages: [boost]
//! ```
//!
//! A rule is either a plain package list (possibly installer-keyed or
//! version-keyed) or a structured mapping. Structured rules are surfaced as
//! [`RuleValue::Compound`] and never expanded.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use serde_yaml::Value;

use crate::resolver::{RuleSource, RuleValue, RuleView};
use crate::util::http;

/// Default rule lists, mirroring the stock rosdep sources configuration.
pub const DEFAULT_RULE_LISTS: &[&str] = &[
    "https://raw.githubusercontent.com/ros/rosdistro/master/rosdep/base.yaml",
    "https://raw.githubusercontent.com/ros/rosdistro/master/rosdep/python.yaml",
    "https://raw.githubusercontent.com/ros/rosdistro/master/rosdep/ruby.yaml",
];

/// The native platform rules are evaluated against.
#[derive(Debug, Clone)]
pub struct Platform {
    /// OS family as rosdep names it (`alpine`, `ubuntu`, ...)
    pub os_name: String,

    /// OS version or codename (`3.18`, `bionic`, ...)
    pub os_version: String,

    /// Installer backends for this OS, in lookup priority order
    pub installers: Vec<String>,

    /// Backend that owns bare (non-installer-keyed) rules
    pub default_installer: String,
}

fn installers_for(os_name: &str) -> (&'static [&'static str], &'static str) {
    match os_name {
        "ubuntu" | "debian" => (&["apt", "pip", "gem"], "apt"),
        "arch" | "manjaro" => (&["pacman", "pip"], "pacman"),
        "fedora" | "rhel" | "centos" => (&["dnf", "pip"], "dnf"),
        "osx" => (&["homebrew", "pip"], "homebrew"),
        // alpine and anything unrecognized: apk is the target system
        _ => (&["apk", "pip"], "apk"),
    }
}

impl Platform {
    /// Create a platform with the standard installer set for `os_name`.
    pub fn new(os_name: impl Into<String>, os_version: impl Into<String>) -> Self {
        let os_name = os_name.into();
        let (installers, default_installer) = installers_for(&os_name);
        Platform {
            os_version: os_version.into(),
            installers: installers.iter().map(|s| s.to_string()).collect(),
            default_installer: default_installer.to_string(),
            os_name,
        }
    }

    /// Detect the current platform from `/etc/os-release`.
    pub fn detect() -> Result<Self> {
        let content = std::fs::read_to_string("/etc/os-release")
            .context("failed to read /etc/os-release")?;
        Self::from_os_release(&content)
    }

    /// Parse an os-release document.
    ///
    /// rosdep keys Debian-family rules by codename, so `VERSION_CODENAME`
    /// wins over `VERSION_ID` when both are present.
    pub fn from_os_release(content: &str) -> Result<Self> {
        let mut fields = HashMap::new();
        for line in content.lines() {
            if let Some((key, value)) = line.split_once('=') {
                fields.insert(key.trim(), value.trim().trim_matches('"'));
            }
        }

        let Some(os_name) = fields.get("ID") else {
            bail!("os-release has no ID field");
        };
        let os_version = fields
            .get("VERSION_CODENAME")
            .filter(|v| !v.is_empty())
            .or_else(|| fields.get("VERSION_ID"))
            .copied()
            .unwrap_or("");

        Ok(Platform::new(*os_name, os_version))
    }
}

/// rosdep rule database for one platform.
pub struct RosdepDatabase {
    platform: Platform,
    rules: HashMap<String, Value>,
}

impl RosdepDatabase {
    /// Create an empty database for the given platform.
    pub fn new(platform: Platform) -> Self {
        RosdepDatabase {
            platform,
            rules: HashMap::new(),
        }
    }

    /// Load the stock rule lists, using the local download cache.
    pub fn load_default(platform: Platform) -> Result<Self> {
        let mut db = RosdepDatabase::new(platform);
        for url in DEFAULT_RULE_LISTS {
            let file_name = url.rsplit('/').next().unwrap_or("rules.yaml");
            let text = http::get_text_cached(url, file_name)
                .with_context(|| format!("failed to load rosdep rules from {url}"))?;
            db.load_str(&text)
                .with_context(|| format!("failed to parse rosdep rules from {url}"))?;
        }
        tracing::debug!("loaded {} rosdep rules", db.rules.len());
        Ok(db)
    }

    /// Merge one rule list document into the database.
    ///
    /// Later documents override earlier entries with the same name, matching
    /// rosdep's source ordering.
    pub fn load_str(&mut self, yaml: &str) -> Result<()> {
        let doc: Value = serde_yaml::from_str(yaml).context("invalid rule list YAML")?;
        let Some(mapping) = doc.as_mapping() else {
            bail!("rule list root is not a mapping");
        };
        for (key, value) in mapping {
            if let Some(name) = key.as_str() {
                self.rules.insert(name.to_string(), value.clone());
            }
        }
        Ok(())
    }

    fn rule_for_platform(&self, entry: &Value) -> RuleView {
        let Some(os_rule) = entry.get(self.platform.os_name.as_str()) else {
            return RuleView::NoPlatformMatch;
        };

        if !os_rule.is_mapping() {
            return self.classify(&self.platform.default_installer, os_rule);
        }

        // Installer-keyed rules win over version maps.
        for installer in &self.platform.installers {
            if let Some(rule) = os_rule.get(installer.as_str()) {
                return self.classify(installer, rule);
            }
        }

        let Some(version_rule) = os_rule
            .get(self.platform.os_version.as_str())
            .or_else(|| os_rule.get("*"))
        else {
            return RuleView::NoPlatformMatch;
        };

        if !version_rule.is_mapping() {
            return self.classify(&self.platform.default_installer, version_rule);
        }

        for installer in &self.platform.installers {
            if let Some(rule) = version_rule.get(installer.as_str()) {
                return self.classify(installer, rule);
            }
        }

        RuleView::Matched {
            installer: self.platform.default_installer.clone(),
            rule: RuleValue::Compound,
        }
    }

    fn classify(&self, installer: &str, rule: &Value) -> RuleView {
        let value = match rule {
            // An explicit null means "nothing to install here".
            Value::Null => RuleValue::Packages(Vec::new()),
            Value::String(s) => {
                RuleValue::Packages(s.split_whitespace().map(str::to_string).collect())
            }
            Value::Sequence(seq) => {
                let mut packages = Vec::with_capacity(seq.len());
                for item in seq {
                    match item.as_str() {
                        Some(s) => packages.push(s.to_string()),
                        None => {
                            return RuleView::Matched {
                                installer: installer.to_string(),
                                rule: RuleValue::Compound,
                            }
                        }
                    }
                }
                RuleValue::Packages(packages)
            }
            _ => RuleValue::Compound,
        };

        RuleView::Matched {
            installer: installer.to_string(),
            rule: value,
        }
    }
}

impl RuleSource for RosdepDatabase {
    fn lookup(&self, name: &str) -> Option<RuleView> {
        let entry = self.rules.get(name)?;
        Some(self.rule_for_platform(entry))
    }

    fn resolve(&self, _installer: &str, rule: &RuleValue) -> Vec<String> {
        match rule {
            RuleValue::Packages(packages) => packages.clone(),
            RuleValue::Compound => Vec::new(),
        }
    }
}

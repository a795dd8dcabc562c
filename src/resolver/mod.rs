//! rosdep dependency name resolution.
//!
//! The resolver turns abstract rosdep names into native apk package
//! identifiers. Rule lookup is behind the [`RuleSource`] trait so the
//! resolver can be tested against an in-memory rule set; the production
//! implementation lives in [`rosdep`].

pub mod errors;
pub mod rosdep;

pub use errors::ResolveError;

use crate::core::pkgname::native_pkgname;

/// The value side of a platform rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleValue {
    /// Plain list of native package identifiers.
    Packages(Vec<String>),

    /// Structured rule (version maps, source installs, installer options).
    /// These are never expanded into package identifiers.
    Compound,
}

/// What the rule database knows about one name on the current platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleView {
    /// A rule matched; `installer` is the backend that owns it.
    Matched { installer: String, rule: RuleValue },

    /// The name is registered, but no rule covers the current OS/version.
    NoPlatformMatch,
}

/// Platform rule database, injected into the resolver.
pub trait RuleSource {
    /// Look up the rule view for `name`. `None` means the name is entirely
    /// unknown to the database.
    fn lookup(&self, name: &str) -> Option<RuleView>;

    /// Expand a matched rule into native package identifiers using the
    /// given installer backend.
    fn resolve(&self, installer: &str, rule: &RuleValue) -> Vec<String>;
}

/// Resolves rosdep names against a rule source for one ROS distribution.
pub struct Resolver<'a> {
    ros_distro: &'a str,
    rules: &'a dyn RuleSource,
}

impl<'a> Resolver<'a> {
    /// Create a resolver for the given distribution and rule source.
    pub fn new(ros_distro: &'a str, rules: &'a dyn RuleSource) -> Self {
        Resolver { ros_distro, rules }
    }

    /// Resolve a list of rosdep names into native package identifiers.
    ///
    /// Names unknown to the rule source fall back to the distro-scoped apk
    /// name and never fail. Names whose rules do not cover the current
    /// platform, and names with compound rules, are collected; if any exist
    /// after the whole list is processed the call fails with all of them in
    /// one error. No partial list is ever returned.
    ///
    /// Result order follows input order; multi-package rules keep the order
    /// the installer returned.
    pub fn resolve(&self, names: &[String]) -> Result<Vec<String>, ResolveError> {
        let mut keys = Vec::new();
        let mut not_provided = Vec::new();

        for name in names {
            match self.rules.lookup(name) {
                None => {
                    tracing::debug!("no rosdep rule for `{}`, assuming ROS package", name);
                    keys.push(native_pkgname(self.ros_distro, name));
                }
                Some(RuleView::NoPlatformMatch) => {
                    not_provided.push(name.clone());
                }
                Some(RuleView::Matched {
                    rule: RuleValue::Compound,
                    ..
                }) => {
                    not_provided.push(name.clone());
                }
                Some(RuleView::Matched { installer, rule }) => {
                    keys.extend(self.rules.resolve(&installer, &rule));
                }
            }
        }

        if !not_provided.is_empty() {
            return Err(ResolveError::NotProvided {
                names: not_provided,
            });
        }

        Ok(keys)
    }
}

//! rosdistro release index client.
//!
//! Looks a package up through the public rosdistro index: the index names a
//! distribution file per ROS distro, the distribution file names a release
//! repository per package, and the release repository carries one
//! `package.xml` at its root for every `release/<distro>/<package>/<version>`
//! tag that bloom created. The manifest is fetched from the raw file host
//! at that tag.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use url::Url;

use crate::util::http;

/// Default index location, overridable via `ROSDISTRO_INDEX_URL`.
pub const DEFAULT_INDEX_URL: &str =
    "https://raw.githubusercontent.com/ros/rosdistro/master/index-v4.yaml";

#[derive(Debug, Deserialize)]
struct Index {
    #[serde(default)]
    distributions: HashMap<String, IndexEntry>,
}

#[derive(Debug, Deserialize)]
struct IndexEntry {
    /// Distribution file paths, relative to the index URL.
    #[serde(default)]
    distribution: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Distribution {
    #[serde(default)]
    repositories: HashMap<String, Repository>,
}

#[derive(Debug, Deserialize)]
struct Repository {
    #[serde(default)]
    release: Option<Release>,
}

#[derive(Debug, Deserialize)]
struct Release {
    #[serde(default)]
    url: Option<String>,

    #[serde(default)]
    version: Option<String>,

    #[serde(default)]
    tags: HashMap<String, String>,

    /// Packages released from this repository. Absent means the repository
    /// releases a single package named after itself.
    #[serde(default)]
    packages: Option<Vec<String>>,
}

/// The configured index URL.
pub fn index_url() -> String {
    std::env::var("ROSDISTRO_INDEX_URL").unwrap_or_else(|_| DEFAULT_INDEX_URL.to_string())
}

/// Fetch the released package.xml for `package` in `ros_distro`.
pub fn release_package_xml(ros_distro: &str, package: &str) -> Result<String> {
    let index_url = Url::parse(&index_url()).context("invalid rosdistro index URL")?;

    tracing::debug!("fetching rosdistro index from {}", index_url);
    let index_text = http::get_text(index_url.as_str())?;
    let distribution_url = distribution_url(&index_url, &index_text, ros_distro)?;

    tracing::debug!("fetching distribution file from {}", distribution_url);
    let distribution_text = http::get_text(distribution_url.as_str())?;
    let manifest_url = release_manifest_url(&distribution_text, package)?;

    tracing::debug!("fetching package.xml from {}", manifest_url);
    http::get_text(&manifest_url)
        .with_context(|| format!("failed to fetch package.xml for `{package}`"))
}

fn distribution_url(index_url: &Url, index_text: &str, ros_distro: &str) -> Result<Url> {
    let index: Index =
        serde_yaml::from_str(index_text).context("failed to parse rosdistro index")?;
    let entry = index
        .distributions
        .get(ros_distro)
        .with_context(|| format!("unknown ROS distribution `{ros_distro}`"))?;
    let relative = entry
        .distribution
        .first()
        .with_context(|| format!("distribution `{ros_distro}` has no distribution file"))?;
    index_url
        .join(relative)
        .with_context(|| format!("invalid distribution file path `{relative}`"))
}

fn release_manifest_url(distribution_text: &str, package: &str) -> Result<String> {
    let distribution: Distribution =
        serde_yaml::from_str(distribution_text).context("failed to parse distribution file")?;

    let (repo_name, release) = find_release(&distribution, package)
        .with_context(|| format!("package `{package}` is not released in this distribution"))?;

    let repo_url = release
        .url
        .as_deref()
        .with_context(|| format!("release repository `{repo_name}` has no URL"))?;
    let version = release
        .version
        .as_deref()
        .with_context(|| format!("release repository `{repo_name}` has no version"))?;

    let tag = release
        .tags
        .get("release")
        .with_context(|| format!("release repository `{repo_name}` has no release tag template"))?
        .replace("{package}", package)
        .replace("{version}", version);

    raw_manifest_url(repo_url, &tag)
}

fn find_release<'a>(
    distribution: &'a Distribution,
    package: &str,
) -> Option<(&'a str, &'a Release)> {
    for (name, repo) in &distribution.repositories {
        let Some(release) = &repo.release else {
            continue;
        };
        let released = match &release.packages {
            Some(packages) => packages.iter().any(|p| p == package),
            None => name == package,
        };
        if released {
            return Some((name.as_str(), release));
        }
    }
    None
}

/// Turn a GitHub release repository URL plus tag into a raw package.xml URL.
fn raw_manifest_url(repo_url: &str, tag: &str) -> Result<String> {
    let url = Url::parse(repo_url)
        .with_context(|| format!("invalid release repository URL `{repo_url}`"))?;
    if url.host_str() != Some("github.com") {
        bail!("unsupported release repository host in `{repo_url}` (only github.com)");
    }
    let path = url.path().trim_start_matches('/').trim_end_matches(".git");
    Ok(format!(
        "https://raw.githubusercontent.com/{path}/{tag}/package.xml"
    ))
}

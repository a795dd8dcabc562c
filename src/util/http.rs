//! Blocking HTTP fetch helpers with an on-disk download cache.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;

const USER_AGENT: &str = concat!("rosapk/", env!("CARGO_PKG_VERSION"));

/// Fetch a URL as UTF-8 text.
pub fn get_text(url: &str) -> Result<String> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build HTTP client")?;

    let response = client
        .get(url)
        .send()
        .with_context(|| format!("failed to fetch {url}"))?
        .error_for_status()
        .with_context(|| format!("failed to fetch {url}"))?;

    response
        .text()
        .with_context(|| format!("failed to read response body from {url}"))
}

/// Fetch a URL, reading/writing the download cache under `file_name`.
///
/// Used for the rosdep rule lists, which change rarely and are large enough
/// that re-downloading them on every invocation is wasteful. Delete the
/// cache directory to force a refresh.
pub fn get_text_cached(url: &str, file_name: &str) -> Result<String> {
    fetch_with_cache(url, cache_path(file_name))
}

fn fetch_with_cache(url: &str, path: Option<PathBuf>) -> Result<String> {
    let Some(path) = path else {
        return get_text(url);
    };

    if let Ok(cached) = fs::read_to_string(&path) {
        tracing::debug!("using cached copy of {} from {}", url, path.display());
        return Ok(cached);
    }

    let text = get_text(url)?;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent).and_then(|_| fs::write(&path, &text)) {
            tracing::warn!("failed to cache {} at {}: {}", url, path.display(), e);
        }
    }

    Ok(text)
}

fn cache_path(file_name: &str) -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "rosapk")?;
    Some(dirs.cache_dir().join(file_name))
}

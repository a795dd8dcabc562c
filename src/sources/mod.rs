//! Manifest acquisition: direct URL fetch or rosdistro release lookup.

pub mod rosdistro;

use anyhow::Result;

use crate::util::http;

/// Fetch the package.xml text for `package`.
///
/// `package` is either an HTTP(S) URL fetched as-is, or a package name
/// looked up through the rosdistro release index for `ros_distro`.
pub fn fetch_manifest_xml(ros_distro: &str, package: &str) -> Result<String> {
    if package.starts_with("http://") || package.starts_with("https://") {
        tracing::debug!("fetching package.xml from {}", package);
        http::get_text(package)
    } else {
        rosdistro::release_package_xml(ros_distro, package)
    }
}

//! The apk naming convention for ROS packages.
//!
//! Every ROS package is published under a distro-scoped apk name so that
//! multiple distributions can coexist on one system. The same convention is
//! used as the fallback for rosdep names that no rule list knows about.

/// Convert a ROS package name to its native apk package name.
///
/// The name is prefixed with `ros-<distro>-` and underscores are turned
/// into hyphens, e.g. `roscpp_core` on melodic becomes
/// `ros-melodic-roscpp-core`.
pub fn native_pkgname(ros_distro: &str, name: &str) -> String {
    format!("ros-{}-{}", ros_distro, name.replace('_', "-"))
}

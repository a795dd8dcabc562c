//! CLI definitions using clap.

use clap::Parser;

/// Generate an Alpine APKBUILD recipe for a ROS package
#[derive(Parser)]
#[command(name = "rosapk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Name of the ROS distribution
    #[arg(value_name = "ROS_DISTRO")]
    pub ros_distro: String,

    /// Package name or URL of package.xml
    #[arg(value_name = "PACKAGE")]
    pub package: String,

    /// Disable the check() block (default: enabled)
    #[arg(long)]
    pub nocheck: bool,

    /// Use the upstream repository instead of the release tag
    #[arg(long)]
    pub upstream: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

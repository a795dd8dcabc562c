//! rosapk CLI - APKBUILD generation for ROS packages

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rosapk::core::manifest::PackageManifest;
use rosapk::recipe::assemble;
use rosapk::resolver::rosdep::{Platform, RosdepDatabase};
use rosapk::sources;

mod cli;

use cli::Cli;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging; the recipe owns stdout, so everything else goes to
    // stderr.
    let filter = if cli.verbose {
        EnvFilter::new("rosapk=debug")
    } else {
        EnvFilter::new("rosapk=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    if cli.upstream {
        // TODO: fetch package.xml from the upstream source repository
        // instead of the release tag.
        tracing::warn!("--upstream is not implemented yet; using the release tag");
    }

    let xml = sources::fetch_manifest_xml(&cli.ros_distro, &cli.package)?;
    let pkg = PackageManifest::parse(&xml)?;

    let platform = Platform::detect()?;
    let rules = RosdepDatabase::load_default(platform)?;

    let recipe = assemble(&cli.ros_distro, &pkg, !cli.nocheck, &rules)?;
    println!("{}", recipe);

    Ok(())
}

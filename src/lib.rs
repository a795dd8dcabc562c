//! rosapk - Generate Alpine APKBUILD recipes from ROS package manifests
//!
//! This crate provides the core library functionality for rosapk:
//! parsing `package.xml` manifests, resolving rosdep dependency names
//! into native apk package identifiers, and assembling APKBUILD recipes.

pub mod core;
pub mod recipe;
pub mod resolver;
pub mod sources;
pub mod util;

pub use crate::core::{manifest::PackageManifest, pkgname::native_pkgname};
pub use crate::recipe::{Recipe, Toolchain};
pub use crate::resolver::{Resolver, RuleSource};

//! Core data types: the parsed package manifest and the naming convention.

pub mod manifest;
pub mod pkgname;

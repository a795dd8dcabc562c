//! APKBUILD recipe construction.
//!
//! A [`Recipe`] is pure data: an ordered sequence of lines. Nothing in this
//! module performs I/O; printing is left to the CLI boundary so assembled
//! recipes can be compared against expected line sequences in tests.

pub mod assemble;

pub use assemble::assemble;

use std::fmt;

use thiserror::Error;

/// An assembled APKBUILD, line by line.
///
/// Immutable once assembly returns it; line order is the wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    lines: Vec<String>,
}

impl Recipe {
    pub(crate) fn new() -> Self {
        Recipe { lines: Vec::new() }
    }

    pub(crate) fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// The recipe lines, in emission order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

/// The build toolchain a package declares via its buildtool dependencies.
///
/// Exactly one of the two markers must appear in `buildtool_depend`; the sum
/// type makes the both-set and neither-set states unrepresentable past
/// [`Toolchain::detect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toolchain {
    Catkin,
    Cmake,
}

/// A manifest declares no supported buildtool, or both.
#[derive(Debug, Error)]
#[error("unsupported buildtool: {}", buildtool_depends.join(" "))]
pub struct ToolchainError {
    buildtool_depends: Vec<String>,
}

impl Toolchain {
    /// Select the toolchain from the buildtool dependency list.
    pub fn detect(buildtool_depends: &[String]) -> Result<Self, ToolchainError> {
        let catkin = buildtool_depends.iter().any(|d| d == "catkin");
        let cmake = buildtool_depends.iter().any(|d| d == "cmake");

        match (catkin, cmake) {
            (true, false) => Ok(Toolchain::Catkin),
            (false, true) => Ok(Toolchain::Cmake),
            _ => Err(ToolchainError {
                buildtool_depends: buildtool_depends.to_vec(),
            }),
        }
    }
}

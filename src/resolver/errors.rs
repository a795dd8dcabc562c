//! Resolution error types.

use thiserror::Error;

/// Error during rosdep name resolution.
///
/// Resolution is all-or-nothing: one error carries every name that could
/// not be resolved, so the user sees the full batch in one diagnostic.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("some packages are not provided by a native installer: {}", names.join(" "))]
    NotProvided { names: Vec<String> },
}

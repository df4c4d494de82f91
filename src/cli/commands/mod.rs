//! CLI command implementations

pub mod build;
pub mod detect;
pub mod inspect;

pub use build::execute as build;
pub use detect::execute as detect;
pub use inspect::execute as inspect;

use crate::error::{AssetsError, AssetsResult};
use std::path::{Path, PathBuf};

/// Resolve an optional directory argument to an absolute path
///
/// Symlinks created during a build point at absolute layer paths, so both
/// the application root and the layers root are made absolute up front.
pub(crate) fn absolute_dir(arg: Option<&Path>) -> AssetsResult<PathBuf> {
    match arg {
        Some(path) => std::path::absolute(path)
            .map_err(|e| AssetsError::io(format!("resolving {}", path.display()), e)),
        None => std::env::current_dir()
            .map_err(|e| AssetsError::io("getting current directory", e)),
    }
}

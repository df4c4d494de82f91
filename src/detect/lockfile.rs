//! Node lockfile presence

use crate::error::{AssetsError, AssetsResult};
use std::fs;
use std::io;
use std::path::Path;

/// Lockfiles that mean node modules get installed before compiling
pub const NODE_LOCKFILES: &[&str] = &["yarn.lock", "package-lock.json"];

/// Whether `working_dir` contains a node package manager lockfile
///
/// Stat errors other than not-found are returned, naming the lockfile.
pub fn has_node_lockfile(working_dir: &Path) -> AssetsResult<bool> {
    for name in NODE_LOCKFILES {
        let path = working_dir.join(name);
        match fs::metadata(&path) {
            Ok(_) => return Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(AssetsError::DetectStat { path, source: e }),
        }
    }
    Ok(false)
}

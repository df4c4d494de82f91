//! Content digest over asset source directories
//!
//! The digest is the cache key for the assets layer: same sources, same
//! digest, reuse the compiled output.

use crate::error::{AssetsError, AssetsResult};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Computes a digest over an ordered list of directories
pub trait Calculator: Send + Sync {
    /// Digest the contents of `paths`, in the order given
    fn sum(&self, paths: &[PathBuf]) -> AssetsResult<String>;
}

/// SHA-256 checksum calculator
///
/// For every root, entries are visited sorted by file name and the hash is
/// fed the entry kind, its `/`-joined path relative to the root, and its
/// content (file bytes or link target). Absolute locations never enter the
/// digest, so the same tree yields the same value on any machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChecksumCalculator;

impl ChecksumCalculator {
    /// Create a new calculator
    pub fn new() -> Self {
        Self
    }

    fn sum_root(hasher: &mut Sha256, root: &Path) -> AssetsResult<()> {
        match fs::symlink_metadata(root) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Skipping missing checksum path {}", root.display());
                return Ok(());
            }
            Err(e) => {
                return Err(AssetsError::Checksum {
                    path: root.to_path_buf(),
                    source: e,
                })
            }
        }

        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        update_field(hasher, b"root");
        update_field(hasher, name.as_bytes());

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()));

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                AssetsError::Checksum {
                    path,
                    source: e
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::other("filesystem loop detected")),
                }
            })?;

            let path = entry.path();
            let file_type = entry.file_type();
            if entry.depth() == 0 && file_type.is_dir() {
                continue;
            }

            let rel = relative_key(path.strip_prefix(root).unwrap_or(path));

            if file_type.is_dir() {
                update_field(hasher, b"d");
                update_field(hasher, rel.as_bytes());
            } else if file_type.is_symlink() {
                let target = fs::read_link(path).map_err(|e| AssetsError::Checksum {
                    path: path.to_path_buf(),
                    source: e,
                })?;
                update_field(hasher, b"l");
                update_field(hasher, rel.as_bytes());
                update_field(hasher, target.to_string_lossy().as_bytes());
            } else {
                let contents = fs::read(path).map_err(|e| AssetsError::Checksum {
                    path: path.to_path_buf(),
                    source: e,
                })?;
                update_field(hasher, b"f");
                update_field(hasher, rel.as_bytes());
                update_field(hasher, &contents);
            }
        }

        Ok(())
    }
}

impl Calculator for ChecksumCalculator {
    fn sum(&self, paths: &[PathBuf]) -> AssetsResult<String> {
        let mut hasher = Sha256::new();

        for root in paths {
            Self::sum_root(&mut hasher, root)?;
        }

        let digest = hex::encode(hasher.finalize());
        debug!("Checksum over {} path(s): {}", paths.len(), digest);
        Ok(digest)
    }
}

/// Length-prefix every field so adjacent fields cannot run together
fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

/// Platform-independent relative key (`a/b/c.js`)
fn relative_key(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

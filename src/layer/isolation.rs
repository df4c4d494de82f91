//! Working tree isolation
//!
//! Compiled assets are written into the layer, never into the working tree.
//! Each output location in the working tree is replaced by a symlink to a
//! directory inside the layer, so the compiler writes through the link and
//! the result survives into the next build.

use crate::error::{AssetsError, AssetsResult};
use crate::paths;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Output locations that are always isolated, with their layer directory
pub const FIXED_MAPPINGS: &[(&str, &str)] = &[
    ("public/assets", "public-assets"),
    ("public/packs", "public-packs"),
    ("tmp/cache/assets", "tmp-cache-assets"),
];

/// One working-tree path and the layer directory backing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedPath {
    /// Path relative to the working tree
    pub local: PathBuf,
    /// Directory name inside the layer
    pub slug: String,
}

/// The full set of isolated paths for one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsolationMapping {
    entries: Vec<MappedPath>,
}

impl IsolationMapping {
    /// Fixed mappings followed by extra destinations in configuration order
    ///
    /// Extra destinations are confined to the working tree: an absolute
    /// path is taken relative to it, `..` cannot climb out of it, and a path
    /// naming the working tree itself is ignored.
    pub fn new(extra_destinations: &[PathBuf]) -> Self {
        let mut entries: Vec<MappedPath> = FIXED_MAPPINGS
            .iter()
            .map(|(local, slug)| MappedPath {
                local: PathBuf::from(local),
                slug: (*slug).to_string(),
            })
            .collect();

        for extra in extra_destinations {
            let local = paths::confine(extra);
            if local.as_os_str().is_empty() {
                debug!("Ignoring destination {} naming the working tree", extra.display());
                continue;
            }
            let slug = paths::slugify(&local);
            entries.push(MappedPath { local, slug });
        }

        Self { entries }
    }

    /// Mapped paths in order
    pub fn entries(&self) -> &[MappedPath] {
        &self.entries
    }
}

impl Default for IsolationMapping {
    fn default() -> Self {
        Self::new(&[])
    }
}

/// Moves working-tree outputs into a layer
///
/// The three steps are separately callable: a cache hit skips
/// `reset_layer` and only relinks.
pub trait DirectoryIsolator: Send + Sync {
    /// Delete every mapped path in the working tree and recreate its parent
    fn reset_local(&self, working_dir: &Path) -> AssetsResult<()>;

    /// Ensure every layer-side directory exists
    fn reset_layer(&self, layer_path: &Path) -> AssetsResult<()>;

    /// Link every mapped working-tree path to its layer directory
    ///
    /// Anything already occupying a target is an error.
    fn link(&self, layer_path: &Path, working_dir: &Path) -> AssetsResult<()>;
}

/// Isolation backed by real filesystem symlinks
#[derive(Debug, Clone, Default)]
pub struct SymlinkIsolator {
    mapping: IsolationMapping,
}

impl SymlinkIsolator {
    /// Create an isolator for the given mapping
    pub fn new(mapping: IsolationMapping) -> Self {
        Self { mapping }
    }

    /// The mapping this isolator applies
    pub fn mapping(&self) -> &IsolationMapping {
        &self.mapping
    }
}

impl DirectoryIsolator for SymlinkIsolator {
    fn reset_local(&self, working_dir: &Path) -> AssetsResult<()> {
        for entry in self.mapping.entries() {
            remove_path(&working_dir.join(&entry.local))?;
        }

        for entry in self.mapping.entries() {
            let target = working_dir.join(&entry.local);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| {
                    AssetsError::io(format!("creating directory {}", parent.display()), e)
                })?;
            }
        }

        Ok(())
    }

    fn reset_layer(&self, layer_path: &Path) -> AssetsResult<()> {
        for entry in self.mapping.entries() {
            let dir = layer_path.join(&entry.slug);
            fs::create_dir_all(&dir)
                .map_err(|e| AssetsError::io(format!("creating directory {}", dir.display()), e))?;
        }
        Ok(())
    }

    fn link(&self, layer_path: &Path, working_dir: &Path) -> AssetsResult<()> {
        for entry in self.mapping.entries() {
            let original = layer_path.join(&entry.slug);
            let link = working_dir.join(&entry.local);

            debug!("Linking {} -> {}", link.display(), original.display());
            symlink_dir(&original, &link).map_err(|e| AssetsError::Symlink {
                path: link.clone(),
                source: e,
            })?;
        }
        Ok(())
    }
}

/// Remove whatever is at `path` without following a symlink
fn remove_path(path: &Path) -> AssetsResult<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(AssetsError::io(format!("inspecting {}", path.display()), e)),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    result.map_err(|e| AssetsError::io(format!("removing {}", path.display()), e))
}

#[cfg(unix)]
fn symlink_dir(original: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(windows)]
fn symlink_dir(original: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(original, link)
}

//! Lexical path helpers shared by configuration and isolation

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Delimiter used when turning a relative path into a layer directory name
pub const SLUG_DELIMITER: char = '-';

/// Split a platform path list (`:` on Unix) into cleaned, non-empty paths
pub fn split_list(value: impl AsRef<OsStr>) -> Vec<PathBuf> {
    std::env::split_paths(value.as_ref())
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| clean(&p))
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}

/// Normalize a path without touching the filesystem
///
/// Drops `.` segments and trailing separators, and folds `..` into the
/// preceding normal segment when there is one.
pub fn clean(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    out.iter().collect()
}

/// Resolve a configured path as if the working tree were the filesystem root
///
/// Root and prefix components are dropped and `..` never climbs above the
/// start, so joining the result to the working tree stays inside it. An
/// empty result means the path names the working tree itself.
pub fn confine(path: &Path) -> PathBuf {
    let mut out: Vec<&OsStr> = Vec::new();

    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    out.iter().collect()
}

/// Derive the layer-side directory name for a working-tree relative path
///
/// `another/assets/path` becomes `another-assets-path`.
pub fn slugify(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(&SLUG_DELIMITER.to_string())
}

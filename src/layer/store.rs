//! Layer resolution and persistence
//!
//! A layer is a directory under the layers root that the host restores on
//! the next build. Its record lives beside it as `<name>.toml`; launch-time
//! environment defaults live inside it under `env.launch/`.

use crate::environment::Environment;
use crate::error::{AssetsError, AssetsResult};
use crate::layer::metadata::{BuildMetadata, LayerRecord};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Directory inside a layer holding launch-time environment files
pub const LAUNCH_ENV_DIR: &str = "env.launch";

/// Suffix marking an environment file as "set if absent"
const DEFAULT_SUFFIX: &str = ".default";

/// A resolved layer
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Fixed identifier (`assets`)
    pub name: String,

    /// Directory holding the layer contents
    pub path: PathBuf,

    /// Persisted flags and metadata
    pub record: LayerRecord,
}

impl Layer {
    /// Metadata of the last successful build, if any
    pub fn build_metadata(&self) -> Option<BuildMetadata> {
        BuildMetadata::from_table(&self.record.metadata)
    }

    /// Digest of the last successful build, if any
    pub fn cache_sha(&self) -> Option<String> {
        self.build_metadata().map(|m| m.cache_sha)
    }

    /// Launch environment directory
    pub fn launch_env_dir(&self) -> PathBuf {
        self.path.join(LAUNCH_ENV_DIR)
    }
}

/// Reads and writes layers under a layers root
#[derive(Debug, Clone)]
pub struct LayerStore {
    root: PathBuf,
}

impl LayerStore {
    /// Create a store rooted at the host's layers directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layers root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a layer's record file
    pub fn record_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.toml", name))
    }

    /// Resolve a layer, creating its directory and loading its record
    ///
    /// A missing record yields empty metadata.
    pub fn get(&self, name: &str) -> AssetsResult<Layer> {
        let path = self.root.join(name);
        fs::create_dir_all(&path)
            .map_err(|e| AssetsError::io(format!("creating layer {}", path.display()), e))?;

        let record_path = self.record_path(name);
        let record = match fs::read_to_string(&record_path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| AssetsError::LayerMetadata {
                    path: record_path.clone(),
                    reason: e.to_string(),
                })?
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No record for layer {}", name);
                LayerRecord::default()
            }
            Err(e) => {
                return Err(AssetsError::io(
                    format!("reading layer record {}", record_path.display()),
                    e,
                ))
            }
        };

        Ok(Layer {
            name: name.to_string(),
            path,
            record,
        })
    }

    /// Persist new build metadata and mark the layer for launch
    ///
    /// The record file is replaced atomically, so a failed write leaves the
    /// previous record in place.
    pub fn set_metadata(&self, layer: &mut Layer, metadata: &BuildMetadata) -> AssetsResult<()> {
        let mut record = layer.record.clone();
        record.launch = true;
        metadata.merge_into(&mut record.metadata);

        let content = toml::to_string_pretty(&record)?;
        let record_path = self.record_path(&layer.name);
        write_atomic(&self.root, &record_path, content.as_bytes())?;

        debug!(
            "Wrote layer record {} (cache_sha = {})",
            record_path.display(),
            metadata.cache_sha
        );
        layer.record = record;
        Ok(())
    }

    /// Write launch-time defaults into the layer
    ///
    /// Each entry becomes `env.launch/<KEY>.default`, which the host applies
    /// at launch only when the operator has not set `KEY`.
    pub fn write_launch_env(&self, layer: &Layer, defaults: &Environment) -> AssetsResult<()> {
        let dir = layer.launch_env_dir();
        fs::create_dir_all(&dir)
            .map_err(|e| AssetsError::io(format!("creating {}", dir.display()), e))?;

        for (key, value) in defaults.iter() {
            let file = dir.join(format!("{}{}", key, DEFAULT_SUFFIX));
            fs::write(&file, value)
                .map_err(|e| AssetsError::io(format!("writing {}", file.display()), e))?;
        }

        Ok(())
    }

    /// Read launch-time defaults back from the layer
    pub fn read_launch_env(&self, layer: &Layer) -> AssetsResult<Environment> {
        let dir = layer.launch_env_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Environment::new()),
            Err(e) => return Err(AssetsError::io(format!("reading {}", dir.display()), e)),
        };

        let mut env = Environment::new();
        for entry in entries {
            let entry = entry.map_err(|e| AssetsError::io(format!("reading {}", dir.display()), e))?;
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let Some(key) = file_name.strip_suffix(DEFAULT_SUFFIX) else {
                continue;
            };
            let value = fs::read_to_string(entry.path()).map_err(|e| {
                AssetsError::io(format!("reading {}", entry.path().display()), e)
            })?;
            env.set(key, value);
        }

        Ok(env)
    }
}

fn write_atomic(dir: &Path, dest: &Path, content: &[u8]) -> AssetsResult<()> {
    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| AssetsError::io(format!("creating temp file in {}", dir.display()), e))?;
    tmp.write_all(content)
        .map_err(|e| AssetsError::io(format!("writing {}", tmp.path().display()), e))?;
    tmp.persist(dest)
        .map_err(|e| AssetsError::io(format!("replacing {}", dest.display()), e.error))?;
    Ok(())
}

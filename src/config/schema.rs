//! Configuration schema for rails-assets
//!
//! Configuration is read from `.rails-assets.toml` in the application root
//! (or an explicit `--config` path), then overlaid with `BP_*` environment
//! variables.

use crate::paths;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Asset source and destination settings
    pub assets: AssetsConfig,

    /// Build step settings
    pub build: BuildConfig,
}

/// Log verbosity understood by the build log and the tracing filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    /// Parse a `BP_LOG_LEVEL` value; anything other than `debug` is `info`
    pub fn from_env_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("debug") {
            Self::Debug
        } else {
            Self::Info
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
        }
    }
}

/// General application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Build log verbosity
    pub log_level: LogLevel,
}

/// Asset path settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Extra directories, relative to the application root, whose contents
    /// are part of the cache key
    pub extra_source_paths: Vec<PathBuf>,

    /// Extra output directories, relative to the application root, that are
    /// moved into the layer alongside `public/assets`
    pub extra_destination_paths: Vec<PathBuf>,
}

impl AssetsConfig {
    /// Extra source paths, confined to the application root, in
    /// configuration order
    pub fn source_paths(&self) -> Vec<PathBuf> {
        self.extra_source_paths
            .iter()
            .map(|p| paths::confine(p))
            .filter(|p| !p.as_os_str().is_empty())
            .collect()
    }

    /// Extra destination paths, confined to the application root, in
    /// configuration order
    pub fn destination_paths(&self) -> Vec<PathBuf> {
        self.extra_destination_paths
            .iter()
            .map(|p| paths::confine(p))
            .filter(|p| !p.as_os_str().is_empty())
            .collect()
    }
}

/// Build step settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Program that runs `exec rails assets:precompile assets:clean`
    pub command: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            command: "bundle".to_string(),
        }
    }
}

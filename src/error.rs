//! Error types for rails-assets
//!
//! All modules use `AssetsResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rails-assets operations
pub type AssetsResult<T> = Result<T, AssetsError>;

/// All errors that can occur while detecting or building assets
#[derive(Error, Debug)]
pub enum AssetsError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    // Detection errors
    #[error("failed to stat {path}: {source}")]
    DetectStat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse Gemfile: {source}")]
    GemfileParse {
        #[source]
        source: std::io::Error,
    },

    // Cache errors
    #[error("failed to checksum {path}: {source}")]
    Checksum {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid layer metadata at {path}: {reason}")]
    LayerMetadata { path: PathBuf, reason: String },

    #[error("failed to link {path}: {source}")]
    Symlink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("failed to execute {command}: {status}\noutput:\n{output}")]
    BuildProcess {
        command: String,
        status: String,
        output: String,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl AssetsError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a build process error from a command line and its captured output
    pub fn build_process(
        command: impl Into<String>,
        status: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self::BuildProcess {
            command: command.into(),
            status: status.into(),
            output: output.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Symlink { .. } => {
                Some("The working tree must be reset before linking; re-run the build")
            }
            Self::BuildProcess { .. } => {
                Some("Inspect the compiler output above; the previous layer metadata was kept")
            }
            Self::LayerMetadata { .. } => Some("Remove the layer metadata file to force a rebuild"),
            _ => None,
        }
    }
}

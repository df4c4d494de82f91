//! Configuration management for rails-assets

pub mod schema;

pub use schema::{AssetsConfig, BuildConfig, Config, GeneralConfig, LogLevel};

use crate::environment::Environment;
use crate::error::{AssetsError, AssetsResult};
use crate::paths;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extra checksum source directories, platform path-list separated
pub const EXTRA_SOURCE_PATHS_ENV: &str = "BP_RAILS_ASSETS_EXTRA_SOURCE_PATHS";

/// Extra isolated destination directories, platform path-list separated
pub const EXTRA_DESTINATION_PATHS_ENV: &str = "BP_RAILS_ASSETS_EXTRA_DESTINATION_PATHS";

/// Build log verbosity (`DEBUG` or `INFO`)
pub const LOG_LEVEL_ENV: &str = "BP_LOG_LEVEL";

/// Name of the project-local config file
pub const LOCAL_CONFIG_FILE: &str = ".rails-assets.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create a manager that discovers the project-local config file
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a config manager with an explicit file path
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: Some(path),
        }
    }

    /// Find the project-local config file in the application root
    pub fn find_local_config(working_dir: &Path) -> Option<PathBuf> {
        let candidate = working_dir.join(LOCAL_CONFIG_FILE);
        candidate.is_file().then_some(candidate)
    }

    /// Load the configuration for an application root
    ///
    /// An explicit path must exist; the project-local file is optional.
    /// Environment variables are applied last and win over the file.
    pub fn load(&self, working_dir: &Path, env: &Environment) -> AssetsResult<Config> {
        let mut config = match &self.config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(AssetsError::ConfigNotFound(path.clone()));
                }
                Self::load_from_file(path)?
            }
            None => match Self::find_local_config(working_dir) {
                Some(path) => {
                    debug!("Found local config: {}", path.display());
                    Self::load_from_file(&path)?
                }
                None => {
                    debug!("No config file, using defaults");
                    Config::default()
                }
            },
        };

        Self::apply_env(&mut config, env);
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> AssetsResult<Config> {
        let content = fs::read_to_string(path)
            .map_err(|e| AssetsError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| AssetsError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Overlay `BP_*` variables onto a loaded configuration
    pub fn apply_env(config: &mut Config, env: &Environment) {
        if let Some(value) = env.get(EXTRA_SOURCE_PATHS_ENV) {
            config.assets.extra_source_paths = paths::split_list(value);
            debug!(
                "{} overrides extra source paths: {:?}",
                EXTRA_SOURCE_PATHS_ENV, config.assets.extra_source_paths
            );
        }

        if let Some(value) = env.get(EXTRA_DESTINATION_PATHS_ENV) {
            config.assets.extra_destination_paths = paths::split_list(value);
            debug!(
                "{} overrides extra destination paths: {:?}",
                EXTRA_DESTINATION_PATHS_ENV, config.assets.extra_destination_paths
            );
        }

        if let Some(value) = env.get(LOG_LEVEL_ENV) {
            config.general.log_level = LogLevel::from_env_value(value);
        }
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

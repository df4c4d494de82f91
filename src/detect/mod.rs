//! Applicability check
//!
//! An application qualifies when it has at least one asset source directory
//! and its Gemfile declares rails. A qualifying application gets a build plan
//! naming the toolchains the compile step needs.

mod gemfile;
mod lockfile;

pub use gemfile::{GemfileParser, LineGemfileParser};
pub use lockfile::{has_node_lockfile, NODE_LOCKFILES};

use crate::error::{AssetsError, AssetsResult};
use crate::orchestration::SOURCE_DIRS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

pub const MISSING_ASSETS: &str =
    "failed to find assets in app/assets, app/javascript, lib/assets, or vendor/assets";
pub const MISSING_RAILS: &str = "failed to find rails gem in Gemfile";

/// Toolchains always required at build time
pub const BUILD_REQUIREMENTS: &[&str] = &["node", "mri", "bundler", "gems"];

/// Required when a node lockfile is present
pub const NODE_MODULES_REQUIREMENT: &str = "node_modules";

/// Metadata attached to every requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlanMetadata {
    /// Needed during the build phase
    pub build: bool,
}

/// One named requirement in the build plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub name: String,
    pub metadata: BuildPlanMetadata,
}

impl Requirement {
    fn build_time(name: &str) -> Self {
        Self {
            name: name.to_string(),
            metadata: BuildPlanMetadata { build: true },
        }
    }
}

/// What the application provides and requires
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    pub provides: Vec<String>,
    pub requires: Vec<Requirement>,
}

impl BuildPlan {
    /// Render as TOML for the host
    pub fn to_toml(&self) -> AssetsResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Requirement names in order
    pub fn requirement_names(&self) -> Vec<&str> {
        self.requires.iter().map(|r| r.name.as_str()).collect()
    }
}

/// Result of the applicability check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// The application qualifies
    Pass(BuildPlan),
    /// The application does not qualify, with the reason
    Fail(String),
}

/// Check whether `working_dir` is a rails application with assets
pub fn detect(working_dir: &Path, parser: &dyn GemfileParser) -> AssetsResult<Detection> {
    if !has_asset_sources(working_dir)? {
        debug!("No asset source directory in {}", working_dir.display());
        return Ok(Detection::Fail(MISSING_ASSETS.to_string()));
    }

    if !parser.has_rails(&working_dir.join("Gemfile"))? {
        return Ok(Detection::Fail(MISSING_RAILS.to_string()));
    }

    let mut requires: Vec<Requirement> = BUILD_REQUIREMENTS
        .iter()
        .map(|name| Requirement::build_time(name))
        .collect();

    if has_node_lockfile(working_dir)? {
        requires.push(Requirement::build_time(NODE_MODULES_REQUIREMENT));
    }

    Ok(Detection::Pass(BuildPlan {
        provides: Vec::new(),
        requires,
    }))
}

fn has_asset_sources(working_dir: &Path) -> AssetsResult<bool> {
    for dir in SOURCE_DIRS {
        let path = working_dir.join(dir);
        match fs::metadata(&path) {
            Ok(_) => return Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(AssetsError::DetectStat { path, source: e }),
        }
    }
    Ok(false)
}

//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Rails Assets - layer-backed cache for Rails asset precompilation
///
/// Compiles assets into a persistent layer and skips the compile step when
/// the asset sources have not changed since the last build.
#[derive(Parser, Debug)]
#[command(name = "rails-assets")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "RAILS_ASSETS_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether the application needs asset compilation
    Detect(DetectArgs),

    /// Compile assets into the layer, or reuse the cached layer
    Build(BuildArgs),

    /// Show the stored metadata of the assets layer
    Inspect(InspectArgs),
}

/// Arguments for the detect command
#[derive(Parser, Debug)]
pub struct DetectArgs {
    /// Application root (defaults to current directory)
    #[arg(short, long)]
    pub working_dir: Option<PathBuf>,
}

/// Arguments for the build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Application root (defaults to current directory)
    #[arg(short, long)]
    pub working_dir: Option<PathBuf>,

    /// Layers directory kept by the host between builds
    #[arg(short, long, env = "CNB_LAYERS_DIR")]
    pub layers: PathBuf,
}

/// Arguments for the inspect command
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Layers directory kept by the host between builds
    #[arg(short, long, env = "CNB_LAYERS_DIR")]
    pub layers: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Output format for the inspect command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
}

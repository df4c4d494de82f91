//! Rails Assets - build cache for Rails asset precompilation
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use rails_assets::cli::{Cli, Commands};
use rails_assets::config::{ConfigManager, LogLevel, LOG_LEVEL_ENV};
use rails_assets::environment::Environment;
use rails_assets::error::AssetsResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> AssetsResult<ExitCode> {
    let cli = Cli::parse();
    let env = Environment::capture();

    // 0 = warn, 1 = info, 2+ = debug; BP_LOG_LEVEL=DEBUG also enables debug
    let env_debug = env
        .get(LOG_LEVEL_ENV)
        .map(LogLevel::from_env_value)
        .is_some_and(|level| level == LogLevel::Debug);
    let filter = match (cli.verbose, env_debug) {
        (_, true) | (2.., _) => EnvFilter::new("rails_assets=debug"),
        (1, _) => EnvFilter::new("rails_assets=info"),
        _ => EnvFilter::new("rails_assets=warn"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let config_manager = match cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };

    match cli.command {
        Commands::Detect(args) => rails_assets::cli::commands::detect(args).await,
        Commands::Build(args) => {
            rails_assets::cli::commands::build(args, &config_manager, &env).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Inspect(args) => {
            rails_assets::cli::commands::inspect(args).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

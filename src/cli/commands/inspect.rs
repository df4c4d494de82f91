//! Inspect command - show what the assets layer was built from

use crate::cli::args::{InspectArgs, OutputFormat};
use crate::error::AssetsResult;
use crate::layer::{Layer, LayerStore, ASSETS_LAYER};
use console::style;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Stored state of the assets layer
#[derive(Debug, Serialize)]
pub struct LayerReport {
    pub name: String,
    pub path: PathBuf,
    pub launch: bool,
    pub build: bool,
    pub cache: bool,
    pub cache_sha: Option<String>,
    pub built_at: Option<String>,
    pub launch_env: BTreeMap<String, String>,
}

impl LayerReport {
    fn collect(store: &LayerStore, layer: &Layer) -> AssetsResult<Self> {
        let metadata = layer.build_metadata();
        let launch_env = store
            .read_launch_env(layer)?
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Ok(Self {
            name: layer.name.clone(),
            path: layer.path.clone(),
            launch: layer.record.launch,
            build: layer.record.build,
            cache: layer.record.cache,
            cache_sha: metadata.as_ref().map(|m| m.cache_sha.clone()),
            built_at: metadata.map(|m| m.built_at),
            launch_env,
        })
    }
}

/// Execute the inspect command
pub async fn execute(args: InspectArgs) -> AssetsResult<()> {
    let store = LayerStore::new(args.layers);

    if !store.record_path(ASSETS_LAYER).exists() {
        match args.format {
            OutputFormat::Json => println!("null"),
            OutputFormat::Table => println!("No assets layer in {}", store.root().display()),
        }
        return Ok(());
    }

    let layer = store.get(ASSETS_LAYER)?;
    let report = LayerReport::collect(&store, &layer)?;

    match args.format {
        OutputFormat::Table => print_table(&report),
        OutputFormat::Json => print_json(&report)?,
    }

    Ok(())
}

fn print_table(report: &LayerReport) {
    let rows = [
        ("LAYER", report.name.clone()),
        ("PATH", report.path.display().to_string()),
        ("LAUNCH", report.launch.to_string()),
        ("BUILD", report.build.to_string()),
        ("CACHE", report.cache.to_string()),
        ("CACHE SHA", report.cache_sha.clone().unwrap_or_else(|| "-".into())),
        ("BUILT AT", report.built_at.clone().unwrap_or_else(|| "-".into())),
    ];

    for (label, value) in rows {
        println!("{:<12} {}", style(label).bold(), value);
    }

    if !report.launch_env.is_empty() {
        println!();
        println!("{}", style("LAUNCH ENVIRONMENT").bold());
        for (key, value) in &report.launch_env {
            println!("  {}={}", key, value);
        }
    }
}

fn print_json(report: &LayerReport) -> AssetsResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

//! Build command - compile assets into the layer or reuse it

use super::absolute_dir;
use crate::cache::ChecksumCalculator;
use crate::cli::args::BuildArgs;
use crate::config::ConfigManager;
use crate::environment::Environment;
use crate::error::AssetsResult;
use crate::layer::{IsolationMapping, LayerStore, SymlinkIsolator};
use crate::orchestration::{
    BuildContext, BuildOrchestrator, BuildOutcome, CommandExecutable, PrecompileProcess,
    SystemClock,
};
use crate::ui::{Emitter, UiContext};
use tracing::{debug, info};

/// Execute the build command
pub async fn execute(args: BuildArgs, manager: &ConfigManager, env: &Environment) -> AssetsResult<()> {
    let working_dir = absolute_dir(args.working_dir.as_deref())?;
    let layers_dir = absolute_dir(Some(args.layers.as_path()))?;
    let config = manager.load(&working_dir, env)?;
    debug!("Loaded configuration: {:?}", config);

    let ctx = UiContext::detect(env);
    let emitter = Emitter::stdout(&ctx).with_level(config.general.log_level);
    emitter.title(format!("Rails Assets {}", env!("CARGO_PKG_VERSION")));

    let process = PrecompileProcess::new(
        CommandExecutable::new(config.build.command.clone()),
        env.clone(),
        emitter.clone(),
    )
    .with_ui(ctx);

    let mapping = IsolationMapping::new(&config.assets.destination_paths());
    let orchestrator = BuildOrchestrator::new(
        process,
        ChecksumCalculator::new(),
        SymlinkIsolator::new(mapping),
        SystemClock,
        emitter,
    );

    let context = BuildContext {
        working_dir,
        layers: LayerStore::new(layers_dir),
        extra_sources: config.assets.source_paths(),
    };

    let result = orchestrator.run(&context).await?;
    match result.outcome {
        BuildOutcome::Reused => info!("Layer reused for digest {}", result.digest),
        BuildOutcome::Rebuilt { .. } => info!("Layer rebuilt for digest {}", result.digest),
    }

    Ok(())
}

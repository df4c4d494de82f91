//! The cache decision
//!
//! One invocation ends in exactly one of two ways: the layer's stored digest
//! matches the current sources and the layer is relinked as is, or the
//! sources changed and the compile step runs into a freshly linked layer.
//! Metadata is written only after a successful compile.

use crate::cache::Calculator;
use crate::environment::Environment;
use crate::error::{AssetsError, AssetsResult};
use crate::layer::{BuildMetadata, DirectoryIsolator, Layer, LayerStore, ASSETS_LAYER};
use crate::orchestration::clock::Clock;
use crate::orchestration::precompile::BuildProcess;
use crate::paths;
use crate::ui::Emitter;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Conventional asset source directories, in checksum order
pub const SOURCE_DIRS: &[&str] = &["app/assets", "lib/assets", "vendor/assets", "app/javascript"];

/// Environment defaults applied at launch unless the operator set them
pub const LAUNCH_DEFAULTS: &[(&str, &str)] = &[
    ("RAILS_ENV", "production"),
    ("RAILS_SERVE_STATIC_FILES", "true"),
];

/// Inputs of one build invocation
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Application root
    pub working_dir: PathBuf,
    /// Host layers directory
    pub layers: LayerStore,
    /// Extra checksum sources, relative to the application root
    pub extra_sources: Vec<PathBuf>,
}

/// How the invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Stored digest matched; the compile step did not run
    Reused,
    /// Sources changed; the compile step ran and succeeded
    Rebuilt {
        /// Wall-clock time of the compile step
        duration: Duration,
    },
}

/// What the host needs after a successful invocation
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// Reuse or rebuild
    pub outcome: BuildOutcome,
    /// Digest of the current sources
    pub digest: String,
    /// The assets layer, with its record as persisted
    pub layer: Layer,
    /// Launch-time defaults stored in the layer
    pub launch_env: Environment,
}

/// Ties checksum, layer, isolation and the compile step together
pub struct BuildOrchestrator {
    build_process: Box<dyn BuildProcess>,
    calculator: Box<dyn Calculator>,
    isolator: Box<dyn DirectoryIsolator>,
    clock: Box<dyn Clock>,
    emitter: Emitter,
}

impl BuildOrchestrator {
    /// Create an orchestrator from its collaborators
    pub fn new(
        build_process: impl BuildProcess + 'static,
        calculator: impl Calculator + 'static,
        isolator: impl DirectoryIsolator + 'static,
        clock: impl Clock + 'static,
        emitter: Emitter,
    ) -> Self {
        Self {
            build_process: Box::new(build_process),
            calculator: Box::new(calculator),
            isolator: Box::new(isolator),
            clock: Box::new(clock),
            emitter,
        }
    }

    /// Run one invocation of the cache decision
    pub async fn run(&self, context: &BuildContext) -> AssetsResult<BuildResult> {
        let working_dir = context.working_dir.as_path();

        self.isolator.reset_local(working_dir)?;

        let paths = checksum_paths(working_dir, &context.extra_sources)?;
        for extra in confined(&context.extra_sources) {
            let path = working_dir.join(extra);
            if !paths.contains(&path) {
                self.emitter
                    .warning(format!("Extra source path {} does not exist", path.display()));
            }
        }
        for path in &paths {
            self.emitter.debug(format!("Checksum source {}", path.display()));
        }
        let digest = self.calculator.sum(&paths)?;

        let mut layer = context.layers.get(ASSETS_LAYER)?;
        let previous = layer.cache_sha();
        debug!("Current digest {}, previous {:?}", digest, previous);

        if previous.as_deref() == Some(digest.as_str()) {
            self.emitter
                .process(format!("Reusing cached layer {}", layer.path.display()));
            // The mapping is not part of the digest; a destination added since
            // the last build still needs its layer directory before linking
            self.isolator.reset_layer(&layer.path)?;
            self.isolator.link(&layer.path, working_dir)?;
            self.emitter.break_line();

            info!("Reused assets layer at {}", layer.path.display());
            let launch_env = context.layers.read_launch_env(&layer)?;
            return Ok(BuildResult {
                outcome: BuildOutcome::Reused,
                digest,
                layer,
                launch_env,
            });
        }

        // Linked before compiling, whatever the outcome of the compile step
        self.isolator.reset_layer(&layer.path)?;
        self.isolator.link(&layer.path, working_dir)?;

        self.emitter.process("Executing build process");
        let started = Instant::now();
        self.build_process.execute(working_dir).await?;
        let duration = started.elapsed();

        self.emitter
            .action(format!("Completed in {}", format_duration(duration)));
        self.emitter.break_line();

        let launch_env = launch_defaults();
        context.layers.write_launch_env(&layer, &launch_env)?;
        context
            .layers
            .set_metadata(&mut layer, &BuildMetadata::new(digest.clone(), self.clock.now()))?;

        self.emitter.process("Configuring launch environment");
        self.emitter.environment(&launch_env);
        self.emitter.break_line();

        info!(
            "Rebuilt assets layer at {} in {:?}",
            layer.path.display(),
            duration
        );
        Ok(BuildResult {
            outcome: BuildOutcome::Rebuilt { duration },
            digest,
            layer,
            launch_env,
        })
    }
}

/// Existing checksum sources: the conventional directories, then the extras
///
/// Extras are confined to the working tree. A source that is absent is
/// skipped; any other stat failure is an error naming the path.
pub fn checksum_paths(working_dir: &Path, extra_sources: &[PathBuf]) -> AssetsResult<Vec<PathBuf>> {
    let candidates = SOURCE_DIRS
        .iter()
        .map(PathBuf::from)
        .chain(confined(extra_sources))
        .map(|rel| working_dir.join(rel));

    let mut paths = Vec::new();
    for path in candidates {
        match fs::metadata(&path) {
            Ok(_) => paths.push(path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Skipping absent source {}", path.display());
            }
            Err(e) => return Err(AssetsError::Checksum { path, source: e }),
        }
    }
    Ok(paths)
}

fn confined(extra_sources: &[PathBuf]) -> impl Iterator<Item = PathBuf> + '_ {
    extra_sources
        .iter()
        .map(|p| paths::confine(p))
        .filter(|p| !p.as_os_str().is_empty())
}

/// The launch defaults as an environment
pub fn launch_defaults() -> Environment {
    LAUNCH_DEFAULTS.iter().copied().collect()
}

/// Round to milliseconds: `250ms`, `1.5s`, `2m3.25s`
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        return format!("{}ms", millis);
    }

    let minutes = millis / 60_000;
    let rest = millis % 60_000;
    let seconds = format!("{}.{:03}", rest / 1000, rest % 1000);
    let seconds = seconds.trim_end_matches('0').trim_end_matches('.');

    if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

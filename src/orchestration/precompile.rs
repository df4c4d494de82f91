//! The asset compile step

use crate::environment::Environment;
use crate::error::{AssetsError, AssetsResult};
use crate::orchestration::process::{Executable, Execution};
use crate::ui::{Emitter, TaskSpinner, UiContext};
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Arguments that compile assets, then drop stale compiled output
pub const PRECOMPILE_ARGS: &[&str] = &["exec", "rails", "assets:precompile", "assets:clean"];

/// Deployment mode forced on the compile step unless the operator set one
pub const RAILS_ENV: (&str, &str) = ("RAILS_ENV", "production");

/// Placeholder secret; Rails refuses to boot in production without one
pub const SECRET_KEY_BASE: (&str, &str) = ("SECRET_KEY_BASE", "dummy");

/// Something that turns sources into compiled assets in a working directory
#[async_trait]
pub trait BuildProcess: Send + Sync {
    /// Run the build with `working_dir` as its root
    async fn execute(&self, working_dir: &Path) -> AssetsResult<()>;
}

/// Runs `bundle exec rails assets:precompile assets:clean`
pub struct PrecompileProcess<E> {
    executable: E,
    base_env: Environment,
    emitter: Emitter,
    ui: UiContext,
}

impl<E: Executable> PrecompileProcess<E> {
    /// Create a compile step that runs `executable` with `base_env` as the
    /// starting environment
    pub fn new(executable: E, base_env: Environment, emitter: Emitter) -> Self {
        Self {
            executable,
            base_env,
            emitter,
            ui: UiContext::non_interactive(),
        }
    }

    /// Show a spinner while the step runs, when the terminal allows it
    pub fn with_ui(mut self, ui: UiContext) -> Self {
        self.ui = ui;
        self
    }

    /// Environment handed to the child process
    ///
    /// Operator-supplied `RAILS_ENV` and `SECRET_KEY_BASE` win over the
    /// defaults. Application binstubs and node binaries are appended to
    /// `PATH`.
    pub fn environment(&self, working_dir: &Path) -> Environment {
        let mut env = self.base_env.clone();
        env.set_default(RAILS_ENV.0, RAILS_ENV.1);
        env.set_default(SECRET_KEY_BASE.0, SECRET_KEY_BASE.1);
        env.append_path("PATH", &working_dir.join("node_modules").join(".bin"));
        env.append_path("PATH", &working_dir.join("bin"));
        env
    }

    fn command_line(&self) -> String {
        format!("{} {}", self.executable.program(), PRECOMPILE_ARGS.join(" "))
    }
}

#[async_trait]
impl<E: Executable> BuildProcess for PrecompileProcess<E> {
    async fn execute(&self, working_dir: &Path) -> AssetsResult<()> {
        let execution = Execution {
            args: PRECOMPILE_ARGS.iter().map(|s| s.to_string()).collect(),
            dir: working_dir.to_path_buf(),
            env: self.environment(working_dir),
        };

        let command = self.command_line();
        self.emitter.subprocess(format!("Running '{}'", command));
        debug!(
            "RAILS_ENV={:?} for compile step",
            execution.env.get(RAILS_ENV.0)
        );

        let mut spinner = TaskSpinner::new(&self.ui);
        spinner.start("Compiling assets");
        let result = self.executable.execute(&execution).await;
        spinner.clear();

        let output = result
            .map_err(|e| AssetsError::build_process(&command, "failed to start", e.to_string()))?;
        if !output.is_success() {
            return Err(AssetsError::build_process(
                command,
                output.status(),
                output.combined(),
            ));
        }

        if self.emitter.is_debug() {
            self.emitter.output(&output.combined());
        }
        Ok(())
    }
}

//! Build orchestration
//!
//! Decides between reusing the cached assets layer and running the compile
//! step, and drives the child process when a rebuild is needed.

mod build;
mod clock;
mod precompile;
mod process;

#[cfg(test)]
pub(crate) mod fakes;

pub use build::{
    checksum_paths, format_duration, launch_defaults, BuildContext, BuildOrchestrator,
    BuildOutcome, BuildResult, LAUNCH_DEFAULTS, SOURCE_DIRS,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use precompile::{BuildProcess, PrecompileProcess, PRECOMPILE_ARGS};
pub use process::{CommandExecutable, Executable, Execution, ExecutionOutput};

//! Detect command - decide whether the application needs asset compilation

use super::absolute_dir;
use crate::cli::args::DetectArgs;
use crate::detect::{self, Detection, LineGemfileParser};
use crate::error::AssetsResult;
use std::process::ExitCode;
use tracing::info;

/// Exit code reported when the application does not qualify
pub const DETECT_FAIL_CODE: u8 = 100;

/// Execute the detect command
///
/// Prints the build plan as TOML on success. A non-qualifying application is
/// not an error; it exits with [`DETECT_FAIL_CODE`].
pub async fn execute(args: DetectArgs) -> AssetsResult<ExitCode> {
    let working_dir = absolute_dir(args.working_dir.as_deref())?;

    match detect::detect(&working_dir, &LineGemfileParser::new())? {
        Detection::Pass(plan) => {
            info!("{} qualifies for asset compilation", working_dir.display());
            print!("{}", plan.to_toml()?);
            Ok(ExitCode::SUCCESS)
        }
        Detection::Fail(reason) => {
            println!("{}", reason);
            Ok(ExitCode::from(DETECT_FAIL_CODE))
        }
    }
}

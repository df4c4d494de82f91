//! UI module for the build log
//!
//! Output is plain, indented text in CI and buildpack lifecycles, with
//! color and a spinner on an interactive terminal.
//!
//! # Example
//!
//! ```rust,ignore
//! use rails_assets::ui::{Emitter, UiContext};
//!
//! let ctx = UiContext::detect(&env);
//! let emitter = Emitter::stdout(&ctx);
//!
//! emitter.title("Rails Assets 0.1.0");
//! emitter.process("Executing build process");
//! emitter.action("Completed in 12.3s");
//! ```

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{Emitter, SharedBuffer};
pub use progress::TaskSpinner;

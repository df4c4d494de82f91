//! Rails Assets - layer-backed build cache for Rails asset precompilation
//!
//! Compiles assets into a persistent layer and reuses it when the digest of
//! the asset sources is unchanged since the last successful build.

pub mod cache;
pub mod cli;
pub mod config;
pub mod detect;
pub mod environment;
pub mod error;
pub mod layer;
pub mod orchestration;
pub mod paths;
pub mod ui;

pub use error::{AssetsError, AssetsResult};

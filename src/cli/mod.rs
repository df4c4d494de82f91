//! Command-line interface

pub mod args;
pub mod commands;

pub use args::{BuildArgs, Cli, Commands, DetectArgs, InspectArgs, OutputFormat};

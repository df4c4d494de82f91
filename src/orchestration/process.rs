//! Child process execution
//!
//! The build step is the only child process the cache runs. It receives an
//! explicit environment and never inherits ambient variables implicitly.

use crate::environment::Environment;
use crate::error::{AssetsError, AssetsResult};
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// A single child process invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// Arguments passed after the program name
    pub args: Vec<String>,
    /// Working directory of the child
    pub dir: PathBuf,
    /// Complete environment of the child
    pub env: Environment,
}

/// Captured result of a finished child process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionOutput {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl ExecutionOutput {
    /// Successful output with the given stdout
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Whether the child exited with status zero
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// Stdout followed by stderr
    pub fn combined(&self) -> String {
        let mut out = self.stdout.clone();
        if !out.is_empty() && !out.ends_with('\n') && !self.stderr.is_empty() {
            out.push('\n');
        }
        out.push_str(&self.stderr);
        out
    }

    /// Human-readable exit status
    pub fn status(&self) -> String {
        match self.code {
            Some(code) => format!("exit status: {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs a fixed program with varying arguments
#[async_trait]
pub trait Executable: Send + Sync {
    /// The program name, for display
    fn program(&self) -> &str;

    /// Run the program to completion and capture its output
    ///
    /// A non-zero exit is reported through [`ExecutionOutput::code`], not as
    /// an error. Errors mean the program could not be run at all.
    async fn execute(&self, execution: &Execution) -> AssetsResult<ExecutionOutput>;
}

/// Executable backed by a real program on `PATH`
#[derive(Debug, Clone)]
pub struct CommandExecutable {
    program: String,
}

impl CommandExecutable {
    /// Create an executable for `program`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl fmt::Display for CommandExecutable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)
    }
}

#[async_trait]
impl Executable for CommandExecutable {
    fn program(&self) -> &str {
        &self.program
    }

    async fn execute(&self, execution: &Execution) -> AssetsResult<ExecutionOutput> {
        debug!(
            "Executing: {} {:?} in {}",
            self.program,
            execution.args,
            execution.dir.display()
        );

        let output = Command::new(&self.program)
            .args(&execution.args)
            .current_dir(&execution.dir)
            .env_clear()
            .envs(execution.env.iter_os())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| AssetsError::io(format!("running {}", self.program), e))?;

        Ok(ExecutionOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

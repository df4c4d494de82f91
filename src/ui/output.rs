//! Build log output
//!
//! The build log is the operator-facing record of what the cache decided and
//! why. It is indented by depth: titles at column zero, processes at two,
//! subprocesses at four, actions at six.

use super::context::UiContext;
use crate::config::LogLevel;
use crate::environment::Environment;
use console::style;
use std::fmt::Display;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Writes the build log to a sink
#[derive(Clone)]
pub struct Emitter {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
    color: bool,
    level: LogLevel,
}

impl Emitter {
    /// Create an emitter that writes to `sink`
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(sink))),
            color: false,
            level: LogLevel::Info,
        }
    }

    /// Create an emitter on stdout, colored when interactive
    pub fn stdout(ctx: &UiContext) -> Self {
        Self::new(io::stdout()).with_color(ctx.use_fancy_output())
    }

    /// Enable or disable ANSI styling
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Set the verbosity; `Debug` enables [`Emitter::debug`] lines
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Whether debug lines are written
    pub fn is_debug(&self) -> bool {
        self.level == LogLevel::Debug
    }

    /// Top-level heading, e.g. the tool name and version
    pub fn title(&self, title: impl Display) {
        let line = style(title.to_string())
            .bold()
            .force_styling(self.color)
            .to_string();
        self.line(&line);
    }

    /// A major step of the build
    pub fn process(&self, message: impl Display) {
        self.line(&format!("  {}", message));
    }

    /// A step within a process
    pub fn subprocess(&self, message: impl Display) {
        self.line(&format!("    {}", message));
    }

    /// The result of a step
    pub fn action(&self, message: impl Display) {
        let line = style(message.to_string())
            .dim()
            .force_styling(self.color)
            .to_string();
        self.line(&format!("      {}", line));
    }

    /// A warning that does not stop the build
    pub fn warning(&self, message: impl Display) {
        let line = style(message.to_string())
            .yellow()
            .force_styling(self.color)
            .to_string();
        self.line(&format!("  {}", line));
    }

    /// Verbose detail, written only at debug level
    pub fn debug(&self, message: impl Display) {
        if self.is_debug() {
            self.line(&format!("    {}", message));
        }
    }

    /// Multi-line output of a child process, indented under its step
    pub fn output(&self, text: &str) {
        for line in text.lines() {
            self.line(&format!("      {}", line));
        }
    }

    /// Blank separator line
    pub fn break_line(&self) {
        self.line("");
    }

    /// List environment variables as `KEY -> "value"`, keys padded to align
    pub fn environment(&self, env: &Environment) {
        let width = env.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, value) in env.iter() {
            self.subprocess(format!("{:<width$} -> {:?}", key, value, width = width));
        }
    }

    fn line(&self, text: &str) {
        // A poisoned or closed sink must never abort the build
        if let Ok(mut sink) = self.sink.lock() {
            let _ = writeln!(sink, "{}", text);
            let _ = sink.flush();
        }
    }
}

/// In-memory sink for capturing the build log
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        self.inner
            .lock()
            .map(|buf| String::from_utf8_lossy(&buf).into_owned())
            .unwrap_or_default()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner
            .lock()
            .map_err(|_| io::Error::other("log buffer poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

use std::io::Write;
use std::process::Command;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::AlertSink;
use crate::error::{AlertError, ValidationError};

/// Which built-in sink to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    Bell,
    Log,
    Command,
}

impl FromStr for SinkKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bell" => Ok(SinkKind::Bell),
            "log" => Ok(SinkKind::Log),
            "command" => Ok(SinkKind::Command),
            other => Err(ValidationError::InvalidValue {
                field: "sink".into(),
                message: format!("unknown sink '{other}' (expected bell, log or command)"),
            }),
        }
    }
}

/// Rings the terminal bell and holds the dispatch slot for the tone length.
#[derive(Debug, Clone)]
pub struct TerminalBell {
    hold: Duration,
}

impl TerminalBell {
    pub fn new(hold: Duration) -> Self {
        Self { hold }
    }
}

impl Default for TerminalBell {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

impl AlertSink for TerminalBell {
    fn name(&self) -> &str {
        "bell"
    }

    fn fire(&self) -> Result<(), AlertError> {
        let mut stderr = std::io::stderr().lock();
        stderr.write_all(b"\x07")?;
        stderr.flush()?;
        drop(stderr);
        thread::sleep(self.hold);
        Ok(())
    }
}

/// Records the alert as a log event only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl AlertSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    fn fire(&self) -> Result<(), AlertError> {
        warn!("distraction alert: get back to studying");
        Ok(())
    }
}

/// Runs an external command (e.g. a sound player) and waits for it.
#[derive(Debug, Clone)]
pub struct CommandSink {
    program: String,
    args: Vec<String>,
}

impl CommandSink {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from an argv-style list; `None` if it is empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }
}

impl AlertSink for CommandSink {
    fn name(&self) -> &str {
        "command"
    }

    fn fire(&self) -> Result<(), AlertError> {
        info!(program = %self.program, "running alert command");
        let status = Command::new(&self.program).args(&self.args).status()?;
        if !status.success() {
            return Err(AlertError::CommandFailed {
                program: self.program.clone(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

//! Privileged command execution.
//!
//! Every kernel mutation (`ip route ...`, `sysctl -w ...`) goes through a
//! [`CommandExecutor`]. Only the exit status matters; output is discarded
//! apart from stderr, which is folded into the error message.

use std::fmt;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::process::Command;
#[cfg(test)]
use tokio::sync::Mutex;
use tracing::{info, trace};

use crate::error::CoreError;

/// An external program invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl SystemCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `sysctl -w key=value`
    pub fn sysctl(key: &str, value: &str) -> Self {
        Self::new("sysctl", ["-w".to_owned(), format!("{key}={value}")])
    }
}

impl fmt::Display for SystemCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Port through which all kernel mutations are issued.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run the command, succeeding only on a zero exit status.
    async fn execute(&self, command: &SystemCommand) -> Result<(), CoreError>;
}

// ── Process backend ──────────────────────────────────────────────────

/// Spawns the command as a child process with a hard timeout.
pub struct ProcessExecutor {
    timeout: Duration,
}

impl ProcessExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(&self, command: &SystemCommand) -> Result<(), CoreError> {
        trace!(%command, "executing command");

        let mut child = Command::new(&command.program);
        child
            .args(&command.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, child.output())
            .await
            .map_err(|_| CoreError::Command {
                command: command.to_string(),
                reason: format!("timed out after {}ms", self.timeout.as_millis()),
            })?
            .map_err(|e| CoreError::Command {
                command: command.to_string(),
                reason: format!("failed to spawn: {e}"),
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        Err(CoreError::Command {
            command: command.to_string(),
            reason: if stderr.is_empty() {
                output.status.to_string()
            } else {
                format!("{}: {stderr}", output.status)
            },
        })
    }
}

// ── Dry-run backend ──────────────────────────────────────────────────

/// Logs commands instead of running them. Nothing is retained between calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunExecutor;

impl DryRunExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandExecutor for DryRunExecutor {
    async fn execute(&self, command: &SystemCommand) -> Result<(), CoreError> {
        info!(%command, "dry run: not executing");
        Ok(())
    }
}

/// Records every command it is handed, in order.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingExecutor {
    issued: Mutex<Vec<SystemCommand>>,
}

#[cfg(test)]
impl RecordingExecutor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Drain the commands recorded so far.
    pub(crate) async fn take(&self) -> Vec<SystemCommand> {
        std::mem::take(&mut *self.issued.lock().await)
    }
}

#[cfg(test)]
#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn execute(&self, command: &SystemCommand) -> Result<(), CoreError> {
        self.issued.lock().await.push(command.clone());
        Ok(())
    }
}

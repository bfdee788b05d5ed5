//! Platform-specific operation errors

use crate::SandboxError;
use thiserror::Error;

/// Errors that can occur while spawning host processes
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    #[error("process execution failed: {command} - {message}")]
    ProcessExecutionFailed { command: String, message: String },

    #[error("process timed out after {seconds}s: {command}")]
    ProcessTimeout { command: String, seconds: u64 },

    #[error("command not found: {command}")]
    CommandNotFound { command: String },
}

impl PlatformError {
    /// Convert a process-level failure into the sandbox taxonomy.
    #[must_use]
    pub fn into_sandbox_error(self, sandbox: &str, command: &str) -> SandboxError {
        match self {
            Self::ProcessTimeout { seconds, .. } => SandboxError::Timeout {
                sandbox: sandbox.to_string(),
                command: command.to_string(),
                seconds,
            },
            other => SandboxError::CommandFailed {
                sandbox: sandbox.to_string(),
                command: command.to_string(),
                message: other.to_string(),
            },
        }
    }
}

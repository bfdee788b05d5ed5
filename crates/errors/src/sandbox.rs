//! Sandbox runtime error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum SandboxError {
    #[error("sandbox command failed in {sandbox}: {command}: {message}")]
    CommandFailed {
        sandbox: String,
        command: String,
        message: String,
    },

    #[error("sandbox command timed out in {sandbox} after {seconds}s: {command}")]
    Timeout {
        sandbox: String,
        command: String,
        seconds: u64,
    },

    #[error("failed to start sandbox {sandbox}: {message}")]
    StartFailed { sandbox: String, message: String },

    #[error("failed to build image {image}: {message}")]
    ImageBuildFailed { image: String, message: String },

    #[error("failed to remove sandbox {sandbox}: {message}")]
    TeardownFailed { sandbox: String, message: String },

    #[error("build log error for {path}: {message}")]
    LogFailed { path: String, message: String },
}

impl UserFacingError for SandboxError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::StartFailed { .. } | Self::ImageBuildFailed { .. } => {
                Some("Check that the docker daemon is running and the image context exists.")
            }
            Self::Timeout { .. } => {
                Some("Raise sandbox.command_timeout_secs or set it to 0 to disable the limit.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::TeardownFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::CommandFailed { .. } => "sandbox.command_failed",
            Self::Timeout { .. } => "sandbox.timeout",
            Self::StartFailed { .. } => "sandbox.start_failed",
            Self::ImageBuildFailed { .. } => "sandbox.image_build_failed",
            Self::TeardownFailed { .. } => "sandbox.teardown_failed",
            Self::LogFailed { .. } => "sandbox.log_failed",
        };
        Some(code)
    }
}

#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for the repro verification pipeline
//!
//! One enum per stage (snapshot lookup, report fetch, sandbox, host
//! process, results) folded into [`Error`] at crate boundaries. Every type
//! is `Clone` so failures can ride inside events.

use std::borrow::Cow;
use std::path::PathBuf;

use thiserror::Error;

pub mod config;
pub mod network;
pub mod ops;
pub mod platform;
pub mod report;
pub mod sandbox;
pub mod snapshot;

pub use config::ConfigError;
pub use network::NetworkError;
pub use ops::OpsError;
pub use platform::PlatformError;
pub use report::ReportError;
pub use sandbox::SandboxError;
pub use snapshot::SnapshotError;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("report error: {0}")]
    Report(#[from] ReportError),

    #[error("sandbox error: {0}")]
    Sandbox(#[from] SandboxError),

    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("ops error: {0}")]
    Ops(#[from] OpsError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O error: {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
        path: Option<PathBuf>,
    },
}

impl Error {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Which pipeline stage produced the error
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Config(_) => "config",
            Self::Snapshot(_) => "snapshot",
            Self::Report(_) => "report",
            Self::Sandbox(_) => "sandbox",
            Self::Platform(_) => "platform",
            Self::Ops(_) => "ops",
            Self::Internal(_) => "internal",
            Self::Io { .. } => "io",
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// What the CLI needs to explain a failure to a person
pub trait UserFacingError {
    fn user_message(&self) -> Cow<'_, str>;

    /// What to try next, if there is anything useful to say
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Repeating the same step could succeed
    fn is_retryable(&self) -> bool {
        false
    }

    /// Dotted code such as `sandbox.timeout`, stable across releases
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl Error {
    fn inner(&self) -> Option<&dyn UserFacingError> {
        match self {
            Self::Network(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            Self::Report(err) => Some(err),
            Self::Sandbox(err) => Some(err),
            Self::Platform(_) | Self::Ops(_) | Self::Internal(_) | Self::Io { .. } => None,
        }
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Self::Network(err) => err.user_message(),
            Self::Sandbox(err) => err.user_message(),
            Self::Io { message, .. } => Cow::Borrowed(message),
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        self.inner().and_then(UserFacingError::user_hint)
    }

    fn is_retryable(&self) -> bool {
        match self {
            Self::Io { .. } => true,
            other => other.inner().is_some_and(UserFacingError::is_retryable),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self.inner() {
            Some(err) => err.user_code(),
            None => Some(match self {
                Self::Platform(_) => "error.platform",
                Self::Ops(_) => "error.ops",
                Self::Io { .. } => "error.io",
                _ => "error.internal",
            }),
        }
    }
}

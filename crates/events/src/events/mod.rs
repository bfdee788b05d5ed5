use serde::{Deserialize, Serialize};

use crate::{EventLevel, EventSource};
use repro_errors::UserFacingError;

/// Error details carried inside failure events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub retryable: bool,
}

impl FailureContext {
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self {
            code: error.user_code().map(str::to_string),
            message: error.user_message().into_owned(),
            hint: error.user_hint().map(str::to_string),
            retryable: error.is_retryable(),
        }
    }
}

pub mod build;
pub mod general;
pub mod sandbox;
pub mod snapshot;
pub mod verification;

pub use build::*;
pub use general::*;
pub use sandbox::*;
pub use snapshot::*;
pub use verification::*;

/// Every event the pipeline can emit, grouped by stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    General(GeneralEvent),

    /// Snapshot resolution
    Snapshot(SnapshotEvent),

    /// Sandbox lifecycle and command execution
    Sandbox(SandboxEvent),

    /// Build executor progress and measurements
    Build(BuildEvent),

    /// Verdicts and persisted results
    Verification(VerificationEvent),
}

impl AppEvent {
    /// Stage the event belongs to
    #[must_use]
    pub fn source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::General,
            Self::Snapshot(_) => EventSource::Snapshot,
            Self::Sandbox(_) => EventSource::Sandbox,
            Self::Build(_) => EventSource::Build,
            Self::Verification(_) => EventSource::Verification,
        }
    }

    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            Self::Sandbox(SandboxEvent::CommandFailed { .. }) => EventLevel::Error,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Snapshot(SnapshotEvent::Insufficient { .. })
            | Self::Sandbox(SandboxEvent::TeardownFailed { .. })
            | Self::Build(BuildEvent::StepAborted { .. })
            | Self::Verification(VerificationEvent::PackageAbandoned { .. }) => EventLevel::Warn,

            Self::General(GeneralEvent::Debug { .. })
            | Self::Snapshot(SnapshotEvent::MonthListed { .. })
            | Self::Sandbox(SandboxEvent::CommandStarted { .. }) => EventLevel::Debug,

            _ => EventLevel::Info,
        }
    }
}

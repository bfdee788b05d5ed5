use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Sandbox lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SandboxEvent {
    /// The build image was missing and is being built
    ImageBuilding { image: String },

    /// A sandbox instance is running for a package
    Provisioned {
        package: String,
        sandbox: String,
        instance_id: String,
    },

    /// Snapshot sources were written into the sandbox
    SourcesConfigured { sandbox: String, sources: usize },

    /// A command is about to run inside the sandbox
    CommandStarted { sandbox: String, command: String },

    /// A command could not be completed
    CommandFailed {
        sandbox: String,
        command: String,
        failure: FailureContext,
    },

    /// The sandbox instance was removed
    TornDown { sandbox: String },

    /// Removal failed; the result is unaffected
    TeardownFailed {
        sandbox: String,
        failure: FailureContext,
    },
}

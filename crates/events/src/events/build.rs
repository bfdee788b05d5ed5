use repro_types::CpuSource;
use serde::{Deserialize, Serialize};

/// Build steps executed inside the sandbox
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BuildStep {
    InstallDependencies,
    FetchSource,
    InstallBuildDependencies,
    Compile,
    Hash,
}

impl BuildStep {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InstallDependencies => "install-dependencies",
            Self::FetchSource => "fetch-source",
            Self::InstallBuildDependencies => "install-build-dependencies",
            Self::Compile => "compile",
            Self::Hash => "hash",
        }
    }
}

/// Build executor events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BuildEvent {
    /// Rebuild of a package started
    Started { package: String, version: String },

    /// A build step started
    StepStarted { package: String, step: BuildStep },

    /// A build step could not run; remaining steps are skipped
    StepAborted {
        package: String,
        step: BuildStep,
        error: String,
    },

    /// Install and build sequence finished
    Completed {
        package: String,
        wall_time: f64,
        user_time: f64,
        system_time: f64,
        cpu_source: CpuSource,
    },

    /// Digest of the rebuilt artifact, empty when hashing failed
    DigestComputed {
        package: String,
        artifact: String,
        digest: String,
    },
}

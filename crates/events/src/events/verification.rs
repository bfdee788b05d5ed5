use repro_types::Outcome;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Verification verdicts and result persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VerificationEvent {
    /// Package list of a run is known
    RunStarted {
        selection: String,
        packages: Vec<String>,
    },

    /// Package pipeline started
    PackageStarted {
        package: String,
        index: usize,
        total: usize,
    },

    /// Package classified
    Classified {
        package: String,
        outcome: Outcome,
        expected: String,
        computed: String,
    },

    /// Package pipeline abandoned before the build
    PackageAbandoned { package: String, reason: String },

    /// Result table written
    ResultsWritten { path: PathBuf, rows: usize },
}

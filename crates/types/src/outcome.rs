//! Build measurements and verification outcomes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Verification verdict for a single rebuild attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The rebuilt artifact has the published digest
    Match,
    /// The rebuild produced an artifact with a different digest
    Mismatch,
    /// No digest could be computed
    Failed,
}

impl Outcome {
    /// Classify a rebuild by comparing digests.
    ///
    /// An empty computed digest always means the build or the hashing step
    /// failed, whatever the expected digest is.
    #[must_use]
    pub fn classify(expected: &str, computed: &str) -> Self {
        if !expected.is_empty() && expected == computed {
            Self::Match
        } else if computed.is_empty() {
            Self::Failed
        } else {
            Self::Mismatch
        }
    }

    /// All outcomes in report order
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Match, Self::Mismatch, Self::Failed]
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Match => write!(f, "match"),
            Self::Mismatch => write!(f, "mismatch"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Where the CPU figures of a measurement came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CpuSource {
    /// Per-sandbox cgroup accounting
    Cgroup,
    /// Host-wide CPU counters; includes unrelated host activity
    Host,
    /// Nothing could be measured
    Unavailable,
}

/// Raw result of running a build inside a sandbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildMeasurement {
    /// Hex SHA-256 of the artifact; empty when the build or hashing failed
    pub digest: String,
    /// Wall-clock seconds spent installing and building
    pub wall_time: f64,
    /// User CPU seconds
    pub user_time: f64,
    /// System CPU seconds
    pub system_time: f64,
    pub cpu_source: CpuSource,
}

impl BuildMeasurement {
    /// A measurement for a build that never got to run
    #[must_use]
    pub fn failed() -> Self {
        Self {
            digest: String::new(),
            wall_time: 0.0,
            user_time: 0.0,
            system_time: 0.0,
            cpu_source: CpuSource::Unavailable,
        }
    }
}

/// Classified, immutable record for one package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildResult {
    pub package: String,
    pub binary: String,
    pub size: String,
    pub outcome: Outcome,
    pub digest: String,
    pub wall_time: f64,
    pub user_time: f64,
    pub system_time: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_match() {
        assert_eq!(Outcome::classify("abc", "abc"), Outcome::Match);
    }

    #[test]
    fn test_classify_failed_on_empty_digest() {
        assert_eq!(Outcome::classify("abc", ""), Outcome::Failed);
        assert_eq!(Outcome::classify("", ""), Outcome::Failed);
    }

    #[test]
    fn test_classify_mismatch() {
        assert_eq!(Outcome::classify("abc", "xyz"), Outcome::Mismatch);
        assert_eq!(Outcome::classify("", "xyz"), Outcome::Mismatch);
    }
}

//! Classified results and their persisted table

use repro_errors::{Error, OpsError};
use repro_types::{BuildMeasurement, BuildResult, Outcome, PackageTarget};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Column names of the persisted table
pub const CSV_HEADER: [&str; 7] = [
    "package",
    "binary",
    "size",
    "wall_time",
    "cpu_user_time",
    "cpu_system_time",
    "outcome",
];

/// Compare the expected and computed digests
#[must_use]
pub fn classify(expected: &str, computed: &str) -> Outcome {
    Outcome::classify(expected, computed)
}

/// Single-letter code written to the table
#[must_use]
pub fn outcome_code(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Match => "y",
        Outcome::Mismatch => "n",
        Outcome::Failed => "f",
    }
}

/// Classify a measurement against the target's expected digest
#[must_use]
pub fn build_result(target: &PackageTarget, measurement: &BuildMeasurement) -> BuildResult {
    BuildResult {
        package: target.name.clone(),
        binary: target.binary_name.clone(),
        size: target.expected_size.clone(),
        outcome: classify(&target.expected_checksum, &measurement.digest),
        digest: measurement.digest.clone(),
        wall_time: measurement.wall_time,
        user_time: measurement.user_time,
        system_time: measurement.system_time,
    }
}

/// Results of one run, bucketed by outcome
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub matched: Vec<BuildResult>,
    pub mismatched: Vec<BuildResult>,
    pub failed: Vec<BuildResult>,
}

impl ResultSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// File a result under its outcome
    pub fn push(&mut self, result: BuildResult) {
        match result.outcome {
            Outcome::Match => self.matched.push(result),
            Outcome::Mismatch => self.mismatched.push(result),
            Outcome::Failed => self.failed.push(result),
        }
    }

    #[must_use]
    pub fn bucket(&self, outcome: Outcome) -> &[BuildResult] {
        match outcome {
            Outcome::Match => &self.matched,
            Outcome::Mismatch => &self.mismatched,
            Outcome::Failed => &self.failed,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matched.len() + self.mismatched.len() + self.failed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Results in table order: matches, then mismatches, then failures
    pub fn iter(&self) -> impl Iterator<Item = &BuildResult> {
        Outcome::all()
            .into_iter()
            .flat_map(move |outcome| self.bucket(outcome).iter())
    }

    /// Render the table as CSV text
    ///
    /// # Errors
    ///
    /// Returns `OpsError::SerializationError` if a row cannot be encoded.
    pub fn to_csv(&self) -> Result<String, Error> {
        let failed = |e: &dyn std::fmt::Display| -> Error {
            OpsError::SerializationError {
                message: e.to_string(),
            }
            .into()
        };

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADER).map_err(|e| failed(&e))?;
        for result in self.iter() {
            let row = [
                result.package.clone(),
                result.binary.clone(),
                result.size.clone(),
                result.wall_time.to_string(),
                result.user_time.to_string(),
                result.system_time.to_string(),
                outcome_code(result.outcome).to_string(),
            ];
            writer.write_record(&row).map_err(|e| failed(&e))?;
        }

        let bytes = writer.into_inner().map_err(|e| failed(&e))?;
        String::from_utf8(bytes).map_err(|e| failed(&e))
    }

    /// Write the table to `path`, replacing any earlier file
    ///
    /// # Errors
    ///
    /// Returns `OpsError::ResultsWriteFailed` if the file cannot be written.
    pub async fn write_csv(&self, path: &Path) -> Result<usize, Error> {
        let text = self.to_csv()?;
        let write_failed = |e: std::io::Error| OpsError::ResultsWriteFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(write_failed)?;
        }
        tokio::fs::write(path, text).await.map_err(write_failed)?;

        Ok(self.len())
    }
}

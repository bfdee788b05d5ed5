#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Verification orchestration for repro
//!
//! Sits between the CLI and the component crates: picks the packages of a
//! run, drives each one through snapshot resolution, report parsing,
//! sandbox provisioning and the build, then classifies the outcome and
//! writes the result table.

mod context;
mod pipeline;
mod results;
mod selection;

pub use context::{OpsContextBuilder, OpsCtx};
pub use pipeline::{run, verify_package};
pub use results::{build_result, classify, outcome_code, ResultSet, CSV_HEADER};
pub use selection::{sample_packages, select_packages};

use repro_errors::{Error, OpsError};
use std::path::PathBuf;

/// Everything a finished run hands back to the CLI
#[derive(Debug, Clone, serde::Serialize)]
pub struct RunReport {
    /// Selection the run was started with, e.g. `popular` or `cli:acl`
    pub selection: String,
    pub results: ResultSet,
    /// Where the result table was written
    pub csv_path: PathBuf,
    pub duration_ms: u64,
}

impl RunReport {
    /// # Errors
    ///
    /// Returns `OpsError::SerializationError` if the report cannot be encoded.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| {
            OpsError::SerializationError {
                message: e.to_string(),
            }
            .into()
        })
    }
}

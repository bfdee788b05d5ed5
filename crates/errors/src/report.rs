//! Build-report parsing error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ReportError {
    #[error("malformed build report for {package}: missing {}", missing.join(", "))]
    MalformedReport {
        package: String,
        missing: Vec<String>,
    },

    #[error("invalid build time '{value}' for {package}")]
    InvalidBuildTime { package: String, value: String },
}

impl UserFacingError for ReportError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::MalformedReport { .. } => {
                Some("The rebuild still runs but is expected to be classified as failed.")
            }
            Self::InvalidBuildTime { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::MalformedReport { .. } => "report.malformed",
            Self::InvalidBuildTime { .. } => "report.invalid_build_time",
        };
        Some(code)
    }
}

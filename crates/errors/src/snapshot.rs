//! Snapshot resolution error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SnapshotError {
    #[error("only {found} of 3 snapshots resolvable for {package}")]
    InsufficientSnapshots { package: String, found: usize },

    #[error("invalid snapshot timestamp: {value}")]
    InvalidTimestamp { value: String },

    #[error("invalid snapshot month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
}

impl UserFacingError for SnapshotError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InsufficientSnapshots { .. } => Some(
                "The build predates the first snapshot of the month; the sandbox runs with fewer sources.",
            ),
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InsufficientSnapshots { .. } => "snapshot.insufficient",
            Self::InvalidTimestamp { .. } => "snapshot.invalid_timestamp",
            Self::InvalidMonth { .. } => "snapshot.invalid_month",
        };
        Some(code)
    }
}

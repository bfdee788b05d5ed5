//! Archive snapshot references

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp format used by the snapshot catalog for anchor text
pub const SNAPSHOT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single dated snapshot of the package archive.
///
/// `token` is the opaque path component published by the catalog
/// (for example `20160601T040301Z/`) and is used verbatim in source lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotRef {
    pub token: String,
    pub timestamp: NaiveDateTime,
}

impl SnapshotRef {
    #[must_use]
    pub fn new(token: impl Into<String>, timestamp: NaiveDateTime) -> Self {
        Self {
            token: token.into(),
            timestamp,
        }
    }
}

impl fmt::Display for SnapshotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            self.token.trim_end_matches('/'),
            self.timestamp.format(SNAPSHOT_TIME_FORMAT)
        )
    }
}

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Snapshot resolution events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SnapshotEvent {
    /// Resolution started for a package built at `build_time`
    Resolving {
        package: String,
        build_time: NaiveDateTime,
    },

    /// A month listing was fetched from the catalog
    MonthListed { year: i32, month: u32, count: usize },

    /// Snapshots selected, oldest first
    Resolved {
        package: String,
        snapshots: Vec<String>,
    },

    /// Fewer than three snapshots could be selected
    Insufficient { package: String, found: usize },
}

//! Pure snapshot selection

use chrono::{Datelike, Duration, NaiveDateTime};
use repro_errors::SnapshotError;
use repro_types::SnapshotRef;

/// Number of snapshots a complete selection holds
pub const REQUIRED_SNAPSHOTS: usize = 3;

/// The distinct (year, month) pairs covering the day before, the day of and
/// the day after `build_time`, in chronological order.
#[must_use]
pub fn months_around(build_time: NaiveDateTime) -> Vec<(i32, u32)> {
    let mut months: Vec<(i32, u32)> = Vec::with_capacity(2);
    for offset in [-1, 0, 1] {
        let day = build_time + Duration::days(offset);
        let key = (day.year(), day.month());
        if !months.contains(&key) {
            months.push(key);
        }
    }
    months
}

/// Select snapshots from month listings given in chronological order.
///
/// Every snapshot strictly before `build_time` is accumulated and the last
/// two are kept; of the snapshots at or after `build_time` only the first
/// encountered is kept. Listing order is trusted and never re-sorted.
#[must_use]
pub fn select_snapshots(listings: &[Vec<SnapshotRef>], build_time: NaiveDateTime) -> Vec<SnapshotRef> {
    let mut before: Vec<&SnapshotRef> = Vec::new();
    let mut after: Option<&SnapshotRef> = None;

    for snapshot in listings.iter().flatten() {
        if snapshot.timestamp < build_time {
            before.push(snapshot);
        } else if after.is_none() {
            after = Some(snapshot);
        }
    }

    let keep_from = before.len().saturating_sub(REQUIRED_SNAPSHOTS - 1);
    before[keep_from..]
        .iter()
        .copied()
        .chain(after)
        .cloned()
        .collect()
}

/// Snapshots chosen for one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotSelection {
    pub package: String,
    pub build_time: NaiveDateTime,
    /// Oldest first; at most [`REQUIRED_SNAPSHOTS`] entries
    pub snapshots: Vec<SnapshotRef>,
}

impl SnapshotSelection {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.snapshots.len() == REQUIRED_SNAPSHOTS
    }

    /// Check that three snapshots were found.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::InsufficientSnapshots` with the number found
    /// otherwise. Callers treat this as a warning and keep the partial list.
    pub fn ensure_complete(&self) -> Result<(), SnapshotError> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(SnapshotError::InsufficientSnapshots {
                package: self.package.clone(),
                found: self.snapshots.len(),
            })
        }
    }

    #[must_use]
    pub fn into_refs(self) -> Vec<SnapshotRef> {
        self.snapshots
    }
}

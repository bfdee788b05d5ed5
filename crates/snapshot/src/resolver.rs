//! Snapshot resolution for a package build time

use chrono::NaiveDateTime;
use repro_errors::Error;
use repro_events::{AppEvent, EventEmitter, EventSender, SnapshotEvent};

use crate::catalog::SnapshotCatalog;
use crate::selection::{months_around, select_snapshots, SnapshotSelection};

/// Resolves the snapshots bracketing a build time
pub struct SnapshotResolver<C> {
    catalog: C,
    tx: Option<EventSender>,
}

impl<C: SnapshotCatalog> SnapshotResolver<C> {
    #[must_use]
    pub fn new(catalog: C) -> Self {
        Self { catalog, tx: None }
    }

    #[must_use]
    pub fn with_events(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Resolve the snapshots for `package` built at `build_time`.
    ///
    /// Each distinct month around the build day is listed once. The returned
    /// selection may hold fewer than three references; use
    /// [`SnapshotSelection::ensure_complete`] to detect that.
    ///
    /// # Errors
    ///
    /// Returns an error if a month listing cannot be fetched.
    pub async fn resolve(
        &self,
        package: &str,
        build_time: NaiveDateTime,
    ) -> Result<SnapshotSelection, Error> {
        self.emit(AppEvent::Snapshot(SnapshotEvent::Resolving {
            package: package.to_string(),
            build_time,
        }));

        let mut listings = Vec::new();
        for (year, month) in months_around(build_time) {
            tracing::debug!(package, year, month, "listing snapshot month");
            listings.push(self.catalog.list_month(year, month).await?);
        }

        let snapshots = select_snapshots(&listings, build_time);

        self.emit(AppEvent::Snapshot(SnapshotEvent::Resolved {
            package: package.to_string(),
            snapshots: snapshots.iter().map(|s| s.token.clone()).collect(),
        }));

        Ok(SnapshotSelection {
            package: package.to_string(),
            build_time,
            snapshots,
        })
    }
}

impl<C> EventEmitter for SnapshotResolver<C> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

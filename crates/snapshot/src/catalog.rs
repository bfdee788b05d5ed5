//! Snapshot catalog access

use async_trait::async_trait;
use chrono::NaiveDateTime;
use regex::Regex;
use repro_config::MirrorConfig;
use repro_errors::{Error, SnapshotError};
use repro_events::{AppEvent, EventEmitter, EventSender, SnapshotEvent};
use repro_net::{fetch_text, NetClient};
use repro_types::{SnapshotRef, SNAPSHOT_TIME_FORMAT};
use std::sync::Arc;

const SHORT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Source of per-month snapshot listings
#[async_trait]
pub trait SnapshotCatalog: Send + Sync {
    /// All snapshots taken in the given month, in catalog order
    async fn list_month(&self, year: i32, month: u32) -> Result<Vec<SnapshotRef>, Error>;
}

#[async_trait]
impl<T: SnapshotCatalog + ?Sized> SnapshotCatalog for Arc<T> {
    async fn list_month(&self, year: i32, month: u32) -> Result<Vec<SnapshotRef>, Error> {
        (**self).list_month(year, month).await
    }
}

/// Catalog served over HTTP by the snapshot archive
pub struct HttpSnapshotCatalog {
    client: NetClient,
    archive_url: String,
    tx: Option<EventSender>,
}

impl HttpSnapshotCatalog {
    #[must_use]
    pub fn new(client: NetClient, mirror: &MirrorConfig) -> Self {
        Self {
            client,
            archive_url: mirror.archive_url(),
            tx: None,
        }
    }

    #[must_use]
    pub fn with_events(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// URL of one month's listing
    #[must_use]
    pub fn month_url(&self, year: i32, month: u32) -> String {
        format!("{}?year={year}&month={month:02}", self.archive_url)
    }
}

impl EventEmitter for HttpSnapshotCatalog {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

#[async_trait]
impl SnapshotCatalog for HttpSnapshotCatalog {
    async fn list_month(&self, year: i32, month: u32) -> Result<Vec<SnapshotRef>, Error> {
        if !(1..=12).contains(&month) {
            return Err(SnapshotError::InvalidMonth { year, month }.into());
        }

        let html = fetch_text(&self.client, &self.month_url(year, month), self).await?;
        let snapshots = parse_listing(&html)?;

        self.emit(AppEvent::Snapshot(SnapshotEvent::MonthListed {
            year,
            month,
            count: snapshots.len(),
        }));

        Ok(snapshots)
    }
}

/// Extract snapshot references from a month listing page.
///
/// Every anchor whose text is a timestamp becomes a reference whose token is
/// the anchor's `href`; navigation links and other anchors are skipped.
///
/// # Errors
///
/// Returns an internal error only if the anchor pattern fails to compile.
pub fn parse_listing(html: &str) -> Result<Vec<SnapshotRef>, Error> {
    let anchor = Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']*)["'][^>]*>\s*([^<]*?)\s*</a>"#)
        .map_err(|e| Error::internal(format!("snapshot anchor pattern: {e}")))?;

    Ok(anchor
        .captures_iter(html)
        .filter_map(|caps| {
            let href = caps.get(1)?.as_str();
            let text = caps.get(2)?.as_str();
            let timestamp = parse_snapshot_time(text)?;
            Some(SnapshotRef::new(href, timestamp))
        })
        .collect())
}

fn parse_snapshot_time(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, SNAPSHOT_TIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, SHORT_TIME_FORMAT))
        .ok()
}

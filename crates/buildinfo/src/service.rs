//! Access to the build-report publishing service

use async_trait::async_trait;
use repro_config::ReportConfig;
use repro_errors::Error;
use repro_events::{EventEmitter, EventSender};
use repro_net::{fetch_text, NetClient};

use crate::page::{parse_package_index, parse_package_page, PackagePage};

/// Read-only view of the report service
#[async_trait]
pub trait ReportService: Send + Sync {
    /// Build time and build-info link for a package
    async fn package_page(&self, package: &str) -> Result<PackagePage, Error>;

    /// Raw `.buildinfo` text linked from a package page
    async fn build_report(&self, page: &PackagePage) -> Result<String, Error>;

    /// Names on the index of reproducible packages
    async fn reproducible_packages(&self) -> Result<Vec<String>, Error>;
}

/// Report service reached over HTTP
pub struct HttpReportService {
    client: NetClient,
    config: ReportConfig,
    tx: Option<EventSender>,
}

impl HttpReportService {
    #[must_use]
    pub fn new(client: NetClient, config: ReportConfig) -> Self {
        Self {
            client,
            config,
            tx: None,
        }
    }

    #[must_use]
    pub fn with_events(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }
}

impl EventEmitter for HttpReportService {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

#[async_trait]
impl ReportService for HttpReportService {
    async fn package_page(&self, package: &str) -> Result<PackagePage, Error> {
        let url = self.config.package_page_url(package);
        let html = fetch_text(&self.client, &url, self).await?;
        parse_package_page(&html, package)
    }

    async fn build_report(&self, page: &PackagePage) -> Result<String, Error> {
        let url = self.config.resolve_link(&page.build_info_href);
        fetch_text(&self.client, &url, self).await
    }

    async fn reproducible_packages(&self) -> Result<Vec<String>, Error> {
        let html = fetch_text(&self.client, &self.config.index_url(), self).await?;
        parse_package_index(&html)
    }
}

//! Everything one verification run needs, wired once by the CLI

use repro_builder::BuildExecutor;
use repro_buildinfo::ReportService;
use repro_config::Config;
use repro_errors::{Error, OpsError};
use repro_events::{EventEmitter, EventSender};
use repro_sandbox::{SandboxManager, SandboxRuntime, SimulatedRuntime};
use repro_snapshot::{SnapshotCatalog, SnapshotResolver};
use std::sync::Arc;

pub struct OpsCtx {
    pub resolver: SnapshotResolver<Arc<dyn SnapshotCatalog>>,
    pub reports: Arc<dyn ReportService>,
    pub sandbox: SandboxManager,
    pub executor: BuildExecutor,
    /// Present when builds are simulated; expected digests are registered here
    pub simulated: Option<Arc<SimulatedRuntime>>,
    pub tx: EventSender,
    pub config: Config,
}

impl EventEmitter for OpsCtx {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }
}

/// Collects the run's collaborators; [`OpsContextBuilder::build`] checks
/// that none is missing
#[derive(Default)]
pub struct OpsContextBuilder {
    catalog: Option<Arc<dyn SnapshotCatalog>>,
    reports: Option<Arc<dyn ReportService>>,
    runtime: Option<Arc<dyn SandboxRuntime>>,
    simulated: Option<Arc<SimulatedRuntime>>,
    tx: Option<EventSender>,
    config: Option<Config>,
}

impl OpsContextBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<dyn SnapshotCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    #[must_use]
    pub fn with_reports(mut self, reports: Arc<dyn ReportService>) -> Self {
        self.reports = Some(reports);
        self
    }

    #[must_use]
    pub fn with_runtime(mut self, runtime: Arc<dyn SandboxRuntime>) -> Self {
        self.runtime = Some(runtime);
        self.simulated = None;
        self
    }

    /// Run builds against `runtime` and let the pipeline register expected
    /// artifacts with it
    #[must_use]
    pub fn with_simulated_runtime(mut self, runtime: Arc<SimulatedRuntime>) -> Self {
        self.runtime = Some(runtime.clone());
        self.simulated = Some(runtime);
        self
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// # Errors
    ///
    /// Returns an error if any required component is missing.
    pub fn build(self) -> Result<OpsCtx, Error> {
        let catalog = require(self.catalog, "snapshot catalog")?;
        let reports = require(self.reports, "report service")?;
        let runtime = require(self.runtime, "sandbox runtime")?;
        let tx = require(self.tx, "event sender")?;
        let config = require(self.config, "config")?;

        let resolver = SnapshotResolver::new(catalog).with_events(tx.clone());
        let sandbox = SandboxManager::new(runtime, config.sandbox.clone(), config.mirror.clone())
            .with_events(tx.clone());
        let executor = BuildExecutor::from_config(&config).with_events(tx.clone());

        Ok(OpsCtx {
            resolver,
            reports,
            sandbox,
            executor,
            simulated: self.simulated,
            tx,
            config,
        })
    }
}

fn require<T>(component: Option<T>, name: &str) -> Result<T, OpsError> {
    component.ok_or_else(|| OpsError::MissingComponent {
        component: name.to_string(),
    })
}

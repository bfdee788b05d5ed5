//! Sandbox lifecycle

use repro_config::{MirrorConfig, SandboxConfig};
use repro_errors::SandboxError;
use repro_events::{AppEvent, EventEmitter, EventSender, FailureContext, SandboxEvent};
use repro_platform::CommandOutput;
use repro_types::SnapshotRef;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::log::BuildLog;
use crate::runtime::SandboxRuntime;

const APT_CONF: &str = "/etc/apt/apt.conf";
const SOURCES_LIST: &str = "/etc/apt/sources.list";

/// A running sandbox owned by one package's pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxHandle {
    pub package: String,
    /// Unique instance name, `repro-<package>-<pid>`
    pub name: String,
    /// Identifier assigned by the runtime
    pub instance_id: String,
}

/// Instance name for `package` in process `pid`.
///
/// Characters the container engine rejects in names are replaced by `_`.
#[must_use]
pub fn sandbox_name(package: &str, pid: u32) -> String {
    let package: String = package
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("repro-{package}-{pid}")
}

/// Wrap `word` in single quotes for `bash -c`
#[must_use]
pub fn shell_quote(word: &str) -> String {
    format!("'{}'", word.replace('\'', r"'\''"))
}

/// `deb` and `deb-src` source lines for each snapshot, in the given order
#[must_use]
pub fn source_lines(mirror: &MirrorConfig, snapshots: &[SnapshotRef]) -> Vec<String> {
    let archive_url = mirror.archive_url();
    snapshots
        .iter()
        .flat_map(|snapshot| {
            ["deb", "deb-src"].map(|kind| {
                format!(
                    "{kind} {archive_url}{} {} {}",
                    snapshot.token, mirror.suite, mirror.component
                )
            })
        })
        .collect()
}

/// Creates, configures and removes sandboxes
pub struct SandboxManager {
    runtime: Arc<dyn SandboxRuntime>,
    config: SandboxConfig,
    mirror: MirrorConfig,
    image_ready: OnceCell<()>,
    tx: Option<EventSender>,
}

impl SandboxManager {
    #[must_use]
    pub fn new(runtime: Arc<dyn SandboxRuntime>, config: SandboxConfig, mirror: MirrorConfig) -> Self {
        Self {
            runtime,
            config,
            mirror,
            image_ready: OnceCell::new(),
            tx: None,
        }
    }

    #[must_use]
    pub fn with_events(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Build the image unless it already exists; done once per manager
    ///
    /// # Errors
    ///
    /// Returns an error if the existence check or the build fails.
    pub async fn ensure_image(&self) -> Result<(), SandboxError> {
        self.image_ready
            .get_or_try_init(|| async {
                let image = &self.config.image;
                if self.runtime.image_exists(image).await? {
                    return Ok(());
                }

                self.emit(AppEvent::Sandbox(SandboxEvent::ImageBuilding {
                    image: image.clone(),
                }));
                self.runtime
                    .build_image(image, &self.config.image_context)
                    .await
            })
            .await
            .map(|_| ())
    }

    /// Start a fresh sandbox for `package` and pin the mirror host name.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be prepared or the instance does
    /// not start. A failure to pin the host name is only reported.
    pub async fn provision(&self, package: &str) -> Result<SandboxHandle, SandboxError> {
        self.ensure_image().await?;

        let name = sandbox_name(package, std::process::id());
        let instance_id = self
            .runtime
            .create_named_instance(&name, &self.config.image, &self.config.init_command)
            .await?;

        let handle = SandboxHandle {
            package: package.to_string(),
            name,
            instance_id,
        };

        tokio::time::sleep(self.config.startup_delay()).await;

        let pin = format!("echo {} {} >> /etc/hosts", self.mirror.ip, self.mirror.host);
        if let Err(e) = self.exec(&handle, &pin, &mut BuildLog::discard()).await {
            self.emit_warning_with_context(
                format!("could not pin {} in {}", self.mirror.host, handle.name),
                e.to_string(),
            );
        }

        self.emit(AppEvent::Sandbox(SandboxEvent::Provisioned {
            package: handle.package.clone(),
            sandbox: handle.name.clone(),
            instance_id: handle.instance_id.clone(),
        }));

        Ok(handle)
    }

    /// Point the sandbox's package manager at the resolved snapshots and
    /// refresh its index.
    ///
    /// # Errors
    ///
    /// Returns the first command that could not be executed. Commands that
    /// run but exit non-zero are only logged.
    pub async fn configure_sources(
        &self,
        handle: &SandboxHandle,
        snapshots: &[SnapshotRef],
        log: &mut BuildLog,
    ) -> Result<(), SandboxError> {
        let lines = source_lines(&self.mirror, snapshots);
        for line in &lines {
            self.exec(
                handle,
                &format!("echo {} >> {SOURCES_LIST}", shell_quote(line)),
                log,
            )
                .await?;
        }

        self.exec(
            handle,
            &format!("echo 'Acquire::Check-Valid-Until \"false\";' >> {APT_CONF}"),
            log,
        )
        .await?;
        self.exec(handle, &format!("cat {SOURCES_LIST}"), log).await?;

        self.emit(AppEvent::Sandbox(SandboxEvent::SourcesConfigured {
            sandbox: handle.name.clone(),
            sources: lines.len(),
        }));

        self.exec(handle, "apt-get update", log).await?;
        Ok(())
    }

    /// Run a shell command in the sandbox and record it in `log`.
    ///
    /// # Errors
    ///
    /// Returns `SandboxError::CommandFailed` or `SandboxError::Timeout` when
    /// the command could not be run to completion.
    pub async fn exec(
        &self,
        handle: &SandboxHandle,
        command: &str,
        log: &mut BuildLog,
    ) -> Result<CommandOutput, SandboxError> {
        self.emit(AppEvent::Sandbox(SandboxEvent::CommandStarted {
            sandbox: handle.name.clone(),
            command: command.to_string(),
        }));

        let result = self
            .runtime
            .exec_in_instance(&handle.name, command, self.config.command_timeout())
            .await;

        let transcript = match &result {
            Ok(output) => output.combined(),
            Err(e) => {
                self.emit(AppEvent::Sandbox(SandboxEvent::CommandFailed {
                    sandbox: handle.name.clone(),
                    command: command.to_string(),
                    failure: FailureContext::from_error(e),
                }));
                format!("{e}\n")
            }
        };

        if let Err(e) = log.record(command, &transcript).await {
            tracing::warn!(sandbox = %handle.name, error = %e, "build log write failed");
        }

        result
    }

    /// Remove the sandbox. Failures are reported and otherwise ignored.
    pub async fn teardown(&self, handle: SandboxHandle) {
        match self.runtime.remove_instance(&handle.name).await {
            Ok(()) => self.emit(AppEvent::Sandbox(SandboxEvent::TornDown {
                sandbox: handle.name,
            })),
            Err(e) => self.emit(AppEvent::Sandbox(SandboxEvent::TeardownFailed {
                sandbox: handle.name,
                failure: FailureContext::from_error(&e),
            })),
        }
    }
}

impl EventEmitter for SandboxManager {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

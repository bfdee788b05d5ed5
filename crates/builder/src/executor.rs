//! Runs a package rebuild inside a provisioned sandbox

use repro_config::{calculate_build_jobs, Config};
use repro_events::{AppEvent, BuildEvent, BuildStep, EventEmitter, EventSender};
use repro_sandbox::{BuildLog, SandboxHandle, SandboxManager};
use repro_types::{BuildMeasurement, CpuSource, PackageTarget};
use std::time::Instant;

use crate::cpu::CpuAccounting;
use crate::digest::{parse_digest, round3};
use crate::steps::{build_commands, hash_command};

/// Executes the install, build and hash steps for one package
pub struct BuildExecutor {
    jobs: usize,
    accounting: CpuAccounting,
    tx: Option<EventSender>,
}

impl BuildExecutor {
    #[must_use]
    pub fn new(jobs: usize, accounting: CpuAccounting) -> Self {
        Self {
            jobs: jobs.max(1),
            accounting,
            tx: None,
        }
    }

    /// Executor using the configured parallelism and cgroup root
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            calculate_build_jobs(config.build.jobs),
            CpuAccounting::new(config.sandbox.cgroup_root.clone()),
        )
    }

    #[must_use]
    pub fn with_events(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Rebuild `target` in the sandbox and hash its artifact.
    ///
    /// Never fails: when a step cannot be run the remaining steps are skipped
    /// and the digest is empty. Timings cover whatever ran.
    pub async fn build(
        &self,
        sandbox: &SandboxManager,
        handle: &SandboxHandle,
        target: &PackageTarget,
        log: &mut BuildLog,
    ) -> BuildMeasurement {
        self.emit(AppEvent::Build(BuildEvent::Started {
            package: target.name.clone(),
            version: target.version.clone(),
        }));

        let host_start = self.accounting.host_sample().await;
        let started = Instant::now();
        let mut aborted = false;

        for (step, command) in build_commands(target, self.jobs) {
            self.emit(AppEvent::Build(BuildEvent::StepStarted {
                package: target.name.clone(),
                step,
            }));

            match sandbox.exec(handle, &command, log).await {
                Ok(output) if !output.success() => {
                    tracing::debug!(
                        package = %target.name,
                        step = step.as_str(),
                        exit_code = ?output.exit_code,
                        "build step exited non-zero"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    self.emit(AppEvent::Build(BuildEvent::StepAborted {
                        package: target.name.clone(),
                        step,
                        error: e.to_string(),
                    }));
                    aborted = true;
                    break;
                }
            }
        }

        let wall_time = started.elapsed().as_secs_f64();
        let (cpu, cpu_source) = self
            .accounting
            .measure(&handle.instance_id, host_start)
            .await;
        if cpu_source == CpuSource::Unavailable {
            self.emit_warning(format!(
                "no CPU accounting available for {}; reporting zero CPU time",
                target.name
            ));
        }

        let measurement = BuildMeasurement {
            digest: String::new(),
            wall_time: round3(wall_time),
            user_time: round3(cpu.user),
            system_time: round3(cpu.system),
            cpu_source,
        };

        self.emit(AppEvent::Build(BuildEvent::Completed {
            package: target.name.clone(),
            wall_time: measurement.wall_time,
            user_time: measurement.user_time,
            system_time: measurement.system_time,
            cpu_source,
        }));

        let digest = if aborted {
            String::new()
        } else {
            self.hash(sandbox, handle, target, log).await
        };

        BuildMeasurement {
            digest,
            ..measurement
        }
    }

    async fn hash(
        &self,
        sandbox: &SandboxManager,
        handle: &SandboxHandle,
        target: &PackageTarget,
        log: &mut BuildLog,
    ) -> String {
        self.emit(AppEvent::Build(BuildEvent::StepStarted {
            package: target.name.clone(),
            step: BuildStep::Hash,
        }));

        let Some(command) = hash_command(target) else {
            self.emit(AppEvent::Build(BuildEvent::StepAborted {
                package: target.name.clone(),
                step: BuildStep::Hash,
                error: "build report names no artifact to hash".to_string(),
            }));
            return String::new();
        };

        let digest = match sandbox.exec(handle, &command, log).await {
            Ok(output) => parse_digest(&output),
            Err(e) => {
                self.emit(AppEvent::Build(BuildEvent::StepAborted {
                    package: target.name.clone(),
                    step: BuildStep::Hash,
                    error: e.to_string(),
                }));
                String::new()
            }
        };

        self.emit(AppEvent::Build(BuildEvent::DigestComputed {
            package: target.name.clone(),
            artifact: target.binary_filename.clone(),
            digest: digest.clone(),
        }));

        digest
    }
}

impl EventEmitter for BuildExecutor {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

//! Integration tests for package rebuilds against the simulated runtime

#[cfg(test)]
mod tests {
    use repro_builder::*;
    use repro_config::{MirrorConfig, SandboxConfig};
    use repro_events::{channel, AppEvent, BuildEvent, BuildStep};
    use repro_sandbox::{BuildLog, DigestBehaviour, SandboxManager, SimulatedRuntime};
    use repro_types::{CpuSource, Outcome, PackageTarget};
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::tempdir;

    const DIGEST: &str = "0d2d9b5f1c3e7a4b8f6e2c1d9a7b5e3f1c0d8e6a4b2f9e7d5c3a1b0f8e6d4c2a";

    fn target() -> PackageTarget {
        PackageTarget {
            version: "8.25-2".into(),
            short_version: "8.25-2".into(),
            binary_name: "coreutils".into(),
            source_dir: "coreutils".into(),
            binary_filename: "coreutils_8.25-2_amd64.deb".into(),
            expected_checksum: DIGEST.into(),
            build_depends: vec!["gcc-5=5.3.1-14".into()],
            ..PackageTarget::new("coreutils")
        }
    }

    fn manager(runtime: Arc<SimulatedRuntime>) -> SandboxManager {
        let config = SandboxConfig {
            startup_delay_ms: 0,
            ..SandboxConfig::default()
        };
        SandboxManager::new(runtime, config, MirrorConfig::default())
    }

    fn no_host_counters(root: &Path) -> CpuAccounting {
        CpuAccounting::new(root).with_proc_stat(root.join("missing-proc-stat"))
    }

    #[tokio::test]
    async fn test_build_runs_steps_and_hashes() {
        let runtime = Arc::new(SimulatedRuntime::new(DigestBehaviour::Fixed(DIGEST.into())));
        let sandbox = manager(runtime.clone());
        let cgroup = tempdir().unwrap();
        let (tx, mut rx) = channel();
        let executor = BuildExecutor::new(4, no_host_counters(cgroup.path())).with_events(tx);

        let handle = sandbox.provision("coreutils").await.unwrap();
        let measurement = executor
            .build(&sandbox, &handle, &target(), &mut BuildLog::discard())
            .await;

        assert_eq!(measurement.digest, DIGEST);
        assert!(measurement.wall_time >= 0.0);

        let prefix = format!("exec {} ", handle.name);
        let commands: Vec<String> = runtime
            .history()
            .into_iter()
            .filter_map(|h| h.strip_prefix(&prefix).map(str::to_string))
            .skip(1)
            .collect();
        assert_eq!(
            commands,
            vec![
                "apt-get install -y gcc-5=5.3.1-14",
                "apt-get source coreutils=8.25-2",
                "apt-get build-dep -y --force-yes coreutils=8.25-2",
                "cd coreutils-8.25/; dpkg-buildpackage -us -uc -tc -j4",
                "sha256sum -- 'coreutils_8.25-2_amd64.deb'",
            ]
        );

        let mut steps = Vec::new();
        while let Ok(message) = rx.try_recv() {
            if let AppEvent::Build(BuildEvent::StepStarted { step, .. }) = message.event {
                steps.push(step);
            }
        }
        assert_eq!(
            steps,
            vec![
                BuildStep::InstallDependencies,
                BuildStep::FetchSource,
                BuildStep::InstallBuildDependencies,
                BuildStep::Compile,
                BuildStep::Hash,
            ]
        );

        sandbox.teardown(handle).await;
    }

    #[tokio::test]
    async fn test_cgroup_v1_accounting_is_preferred() {
        let runtime = Arc::new(SimulatedRuntime::new(DigestBehaviour::Fixed(DIGEST.into())));
        let sandbox = manager(runtime);
        let cgroup = tempdir().unwrap();
        let accounting = no_host_counters(cgroup.path());
        let handle = sandbox.provision("coreutils").await.unwrap();

        let v1 = accounting.cgroup_v1_path(&handle.instance_id);
        std::fs::create_dir_all(v1.parent().unwrap()).unwrap();
        std::fs::write(&v1, "user 12345\nsystem 678\n").unwrap();
        let v2 = accounting.cgroup_v2_path(&handle.instance_id);
        std::fs::create_dir_all(v2.parent().unwrap()).unwrap();
        std::fs::write(&v2, "user_usec 1000000\nsystem_usec 1000000\n").unwrap();

        let executor = BuildExecutor::new(1, accounting);
        let measurement = executor
            .build(&sandbox, &handle, &target(), &mut BuildLog::discard())
            .await;

        assert_eq!(measurement.cpu_source, CpuSource::Cgroup);
        assert!((measurement.user_time - 123.45).abs() < 1e-9);
        assert!((measurement.system_time - 6.78).abs() < 1e-9);
        sandbox.teardown(handle).await;
    }

    #[tokio::test]
    async fn test_cgroup_v2_accounting() {
        let runtime = Arc::new(SimulatedRuntime::new(DigestBehaviour::Fixed(DIGEST.into())));
        let sandbox = manager(runtime);
        let cgroup = tempdir().unwrap();
        let accounting = no_host_counters(cgroup.path());
        let handle = sandbox.provision("coreutils").await.unwrap();

        let v2 = accounting.cgroup_v2_path(&handle.instance_id);
        std::fs::create_dir_all(v2.parent().unwrap()).unwrap();
        std::fs::write(&v2, "usage_usec 3123456\nuser_usec 2123456\nsystem_usec 1000000\n")
            .unwrap();

        let measurement = BuildExecutor::new(1, accounting)
            .build(&sandbox, &handle, &target(), &mut BuildLog::discard())
            .await;

        assert_eq!(measurement.cpu_source, CpuSource::Cgroup);
        assert!((measurement.user_time - 2.123).abs() < 1e-9);
        assert!((measurement.system_time - 1.0).abs() < 1e-9);
        sandbox.teardown(handle).await;
    }

    #[tokio::test]
    async fn test_host_counters_fallback() {
        let runtime = Arc::new(SimulatedRuntime::new(DigestBehaviour::Fixed(DIGEST.into())));
        let sandbox = manager(runtime);
        let dir = tempdir().unwrap();
        let proc_stat = dir.path().join("stat");
        std::fs::write(&proc_stat, "cpu  100 0 50 9000 0 0 0 0 0 0\n").unwrap();
        let accounting = CpuAccounting::new(dir.path().join("cgroup")).with_proc_stat(&proc_stat);

        let handle = sandbox.provision("coreutils").await.unwrap();
        let measurement = BuildExecutor::new(1, accounting)
            .build(&sandbox, &handle, &target(), &mut BuildLog::discard())
            .await;

        assert_eq!(measurement.cpu_source, CpuSource::Host);
        assert!(measurement.user_time.abs() < f64::EPSILON);
        sandbox.teardown(handle).await;
    }

    #[tokio::test]
    async fn test_unavailable_accounting_reports_zero() {
        let runtime = Arc::new(SimulatedRuntime::new(DigestBehaviour::Fixed(DIGEST.into())));
        let sandbox = manager(runtime);
        let dir = tempdir().unwrap();
        let (tx, mut rx) = channel();

        let handle = sandbox.provision("coreutils").await.unwrap();
        let measurement = BuildExecutor::new(1, no_host_counters(dir.path()))
            .with_events(tx)
            .build(&sandbox, &handle, &target(), &mut BuildLog::discard())
            .await;

        assert_eq!(measurement.cpu_source, CpuSource::Unavailable);
        assert!(measurement.user_time.abs() < f64::EPSILON);
        assert!(measurement.system_time.abs() < f64::EPSILON);

        let mut warned = false;
        while let Ok(message) = rx.try_recv() {
            if matches!(message.event, AppEvent::General(_)) {
                warned = true;
            }
        }
        assert!(warned);
        sandbox.teardown(handle).await;
    }

    #[tokio::test]
    async fn test_missing_artifact_yields_empty_digest() {
        let runtime = Arc::new(SimulatedRuntime::new(DigestBehaviour::Missing));
        let sandbox = manager(runtime);
        let dir = tempdir().unwrap();

        let handle = sandbox.provision("coreutils").await.unwrap();
        let measurement = BuildExecutor::new(1, no_host_counters(dir.path()))
            .build(&sandbox, &handle, &target(), &mut BuildLog::discard())
            .await;

        assert_eq!(measurement.digest, "");
        sandbox.teardown(handle).await;
    }

    #[tokio::test]
    async fn test_unnamed_artifact_is_not_hashed() {
        let runtime = Arc::new(SimulatedRuntime::new(DigestBehaviour::Fixed(DIGEST.into())));
        let sandbox = manager(runtime.clone());
        let dir = tempdir().unwrap();
        let (tx, mut rx) = channel();
        let target = PackageTarget {
            binary_filename: String::new(),
            ..target()
        };

        let handle = sandbox.provision("coreutils").await.unwrap();
        let measurement = BuildExecutor::new(1, no_host_counters(dir.path()))
            .with_events(tx)
            .build(&sandbox, &handle, &target, &mut BuildLog::discard())
            .await;

        assert_eq!(measurement.digest, "");
        assert!(!runtime.history().iter().any(|h| h.contains("sha256sum")));
        assert_eq!(
            Outcome::classify(&target.expected_checksum, &measurement.digest),
            Outcome::Failed
        );

        let mut aborted = None;
        while let Ok(message) = rx.try_recv() {
            if let AppEvent::Build(BuildEvent::StepAborted { step, .. }) = message.event {
                aborted = Some(step);
            }
        }
        assert_eq!(aborted, Some(BuildStep::Hash));
        sandbox.teardown(handle).await;
    }

    #[tokio::test]
    async fn test_unrunnable_step_aborts_the_build() {
        let runtime = Arc::new(
            SimulatedRuntime::new(DigestBehaviour::Fixed(DIGEST.into())).failing_commands(),
        );
        let sandbox = manager(runtime.clone());
        let dir = tempdir().unwrap();
        let (tx, mut rx) = channel();

        let handle = sandbox.provision("coreutils").await.unwrap();
        let measurement = BuildExecutor::new(1, no_host_counters(dir.path()))
            .with_events(tx)
            .build(&sandbox, &handle, &target(), &mut BuildLog::discard())
            .await;

        assert_eq!(measurement.digest, "");
        // host pin plus the first build step only
        let execs = runtime
            .history()
            .iter()
            .filter(|h| h.starts_with("exec "))
            .count();
        assert_eq!(execs, 2);

        let mut aborted = None;
        while let Ok(message) = rx.try_recv() {
            if let AppEvent::Build(BuildEvent::StepAborted { step, .. }) = message.event {
                aborted = Some(step);
            }
        }
        assert_eq!(aborted, Some(BuildStep::InstallDependencies));
        sandbox.teardown(handle).await;
    }

    #[tokio::test]
    async fn test_build_log_records_every_step() {
        let runtime = Arc::new(SimulatedRuntime::new(DigestBehaviour::Fixed(DIGEST.into())));
        let sandbox = manager(runtime);
        let dir = tempdir().unwrap();

        let handle = sandbox.provision("coreutils").await.unwrap();
        let mut log = BuildLog::open(dir.path(), "coreutils").await.unwrap();
        BuildExecutor::new(2, no_host_counters(dir.path()))
            .build(&sandbox, &handle, &target(), &mut log)
            .await;
        log.close().await.unwrap();

        let text = std::fs::read_to_string(dir.path().join("coreutils.log")).unwrap();
        assert!(text.contains("--> apt-get source coreutils=8.25-2"));
        assert!(text.contains("--> cd coreutils-8.25/; dpkg-buildpackage -us -uc -tc -j2"));
        assert!(text.contains(&format!("{DIGEST}  coreutils_8.25-2_amd64.deb")));
        sandbox.teardown(handle).await;
    }
}

//! Integration tests for sandbox management

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use repro_config::{MirrorConfig, SandboxConfig};
    use repro_errors::{PlatformError, SandboxError};
    use repro_events::{channel, AppEvent, SandboxEvent};
    use repro_platform::{
        CommandOutput, Platform, PlatformCommand, PlatformContext, ProcessOperations,
    };
    use repro_sandbox::*;
    use repro_types::SnapshotRef;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::tempdir;

    const IMAGE: &str = "repro_build";

    fn config() -> SandboxConfig {
        SandboxConfig {
            startup_delay_ms: 0,
            ..SandboxConfig::default()
        }
    }

    fn snapshots() -> Vec<SnapshotRef> {
        let day = NaiveDate::from_ymd_opt(2016, 6, 1).unwrap();
        vec![
            SnapshotRef::new("20160601T041653Z/", day.and_hms_opt(4, 16, 53).unwrap()),
            SnapshotRef::new("20160601T101437Z/", day.and_hms_opt(10, 14, 37).unwrap()),
            SnapshotRef::new("20160601T163001Z/", day.and_hms_opt(16, 30, 1).unwrap()),
        ]
    }

    #[tokio::test]
    async fn test_image_built_once_when_missing() {
        let runtime = Arc::new(SimulatedRuntime::default());
        let manager = SandboxManager::new(runtime.clone(), config(), MirrorConfig::default());

        let first = manager.provision("acl").await.unwrap();
        manager.teardown(first).await;
        let second = manager.provision("attr").await.unwrap();
        manager.teardown(second).await;

        let history = runtime.history();
        assert_eq!(history.iter().filter(|h| h.starts_with("build ")).count(), 1);
        assert_eq!(history.iter().filter(|h| h.starts_with("images ")).count(), 1);
        assert_eq!(runtime.live_instances(), 0);
    }

    #[tokio::test]
    async fn test_existing_image_is_not_rebuilt() {
        let runtime = Arc::new(SimulatedRuntime::default().with_image(IMAGE));
        let manager = SandboxManager::new(runtime.clone(), config(), MirrorConfig::default());

        let handle = manager.provision("acl").await.unwrap();
        manager.teardown(handle).await;

        assert!(!runtime.history().iter().any(|h| h.starts_with("build ")));
    }

    #[tokio::test]
    async fn test_provision_names_and_pins_host() {
        let runtime = Arc::new(SimulatedRuntime::default().with_image(IMAGE));
        let (tx, mut rx) = channel();
        let manager =
            SandboxManager::new(runtime.clone(), config(), MirrorConfig::default()).with_events(tx);

        let handle = manager.provision("coreutils").await.unwrap();

        assert_eq!(
            handle.name,
            format!("repro-coreutils-{}", std::process::id())
        );
        assert!(!handle.instance_id.is_empty());
        let history = runtime.history();
        assert!(history.contains(&format!("run {} {IMAGE} sleep 3600", handle.name)));
        assert!(history.contains(&format!(
            "exec {} echo 193.62.202.30 snapshot.debian.org >> /etc/hosts",
            handle.name
        )));

        let mut provisioned = false;
        while let Ok(message) = rx.try_recv() {
            if let AppEvent::Sandbox(SandboxEvent::Provisioned { sandbox, .. }) = message.event {
                assert_eq!(sandbox, handle.name);
                provisioned = true;
            }
        }
        assert!(provisioned);
        manager.teardown(handle).await;
    }

    #[tokio::test]
    async fn test_configure_sources_writes_log() {
        let runtime = Arc::new(SimulatedRuntime::default().with_image(IMAGE));
        let manager = SandboxManager::new(runtime.clone(), config(), MirrorConfig::default());
        let dir = tempdir().unwrap();

        let handle = manager.provision("coreutils").await.unwrap();
        let mut log = BuildLog::open(dir.path(), "coreutils").await.unwrap();
        manager
            .configure_sources(&handle, &snapshots(), &mut log)
            .await
            .unwrap();
        let path: PathBuf = log.path().unwrap().to_path_buf();
        log.close().await.unwrap();

        let execs: Vec<String> = runtime
            .history()
            .into_iter()
            .filter_map(|h| {
                h.strip_prefix(&format!("exec {} ", handle.name))
                    .map(str::to_string)
            })
            .collect();
        // host pin, six source lines, apt.conf, cat, update
        assert_eq!(execs.len(), 10);
        assert_eq!(
            execs[1],
            "echo 'deb http://snapshot.debian.org/archive/debian/20160601T041653Z/ stretch main' >> /etc/apt/sources.list"
        );
        assert_eq!(
            execs[7],
            "echo 'Acquire::Check-Valid-Until \"false\";' >> /etc/apt/apt.conf"
        );
        assert_eq!(execs[9], "apt-get update");

        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("--> cat /etc/apt/sources.list"));
        assert!(text.contains(
            "deb-src http://snapshot.debian.org/archive/debian/20160601T163001Z/ stretch main\n"
        ));
        // the host pin happens before the log is opened
        assert!(!text.contains("/etc/hosts"));

        manager.teardown(handle).await;
    }

    #[tokio::test]
    async fn test_failing_commands_surface_as_errors() {
        let runtime = Arc::new(
            SimulatedRuntime::default()
                .with_image(IMAGE)
                .failing_commands(),
        );
        let manager = SandboxManager::new(runtime.clone(), config(), MirrorConfig::default());

        // pinning failure is tolerated
        let handle = manager.provision("acl").await.unwrap();

        let err = manager
            .configure_sources(&handle, &snapshots(), &mut BuildLog::discard())
            .await
            .unwrap_err();
        assert!(matches!(err, SandboxError::CommandFailed { .. }));
        manager.teardown(handle).await;
    }

    #[tokio::test]
    async fn test_teardown_failure_is_swallowed() {
        let runtime = Arc::new(SimulatedRuntime::default().with_image(IMAGE));
        let (tx, mut rx) = channel();
        let manager =
            SandboxManager::new(runtime.clone(), config(), MirrorConfig::default()).with_events(tx);

        let handle = manager.provision("acl").await.unwrap();
        manager.teardown(handle.clone()).await;
        // second removal fails inside the runtime
        manager.teardown(handle).await;

        let mut failures = 0;
        while let Ok(message) = rx.try_recv() {
            if matches!(
                message.event,
                AppEvent::Sandbox(SandboxEvent::TeardownFailed { .. })
            ) {
                failures += 1;
            }
        }
        assert_eq!(failures, 1);
    }

    #[tokio::test]
    async fn test_discard_log_keeps_nothing() {
        let mut log = BuildLog::discard();
        assert!(log.path().is_none());
        log.record("true", "").await.unwrap();
        log.close().await.unwrap();
    }

    /// Process layer that records command lines and answers from a script
    struct ScriptedProcess {
        calls: Arc<Mutex<Vec<String>>>,
        answer: fn(&PlatformCommand) -> Result<CommandOutput, PlatformError>,
    }

    #[async_trait]
    impl ProcessOperations for ScriptedProcess {
        async fn execute_command(
            &self,
            _ctx: &PlatformContext,
            cmd: PlatformCommand,
        ) -> Result<CommandOutput, PlatformError> {
            self.calls.lock().unwrap().push(cmd.display());
            (self.answer)(&cmd)
        }

        async fn which(&self, program: &str) -> Result<PathBuf, PlatformError> {
            Ok(PathBuf::from("/usr/bin").join(program))
        }
    }

    fn output(code: i32, stdout: &str) -> CommandOutput {
        CommandOutput {
            exit_code: Some(code),
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
        }
    }

    fn docker_with(
        answer: fn(&PlatformCommand) -> Result<CommandOutput, PlatformError>,
    ) -> (DockerRuntime, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let process = ScriptedProcess {
            calls: calls.clone(),
            answer,
        };
        let runtime = DockerRuntime::new(Platform::new(Box::new(process)), PlatformContext::default());
        (runtime, calls)
    }

    #[tokio::test]
    async fn test_docker_command_lines() {
        let (docker, calls) = docker_with(|cmd| {
            let args = cmd.get_args();
            Ok(match args[0].as_str() {
                "images" => output(0, ""),
                "run" => output(0, "3f2a9c\n"),
                _ => output(0, "ok"),
            })
        });

        assert!(!docker.image_exists(IMAGE).await.unwrap());
        docker
            .build_image(IMAGE, std::path::Path::new("docker"))
            .await
            .unwrap();
        let id = docker
            .create_named_instance("repro-acl-1", IMAGE, "sleep 3600")
            .await
            .unwrap();
        assert_eq!(id, "3f2a9c");
        let out = docker
            .exec_in_instance("repro-acl-1", "apt-get update", None)
            .await
            .unwrap();
        assert_eq!(out.combined(), "ok");
        docker.remove_instance("repro-acl-1").await.unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                "docker images -q repro_build",
                "docker build -t repro_build docker",
                "docker run --name=repro-acl-1 -d repro_build bash -c sleep 3600",
                "docker exec repro-acl-1 bash -c apt-get update",
                "docker rm -f repro-acl-1",
            ]
        );
    }

    #[tokio::test]
    async fn test_docker_failures_map_to_sandbox_errors() {
        let (docker, _) = docker_with(|cmd| match cmd.get_args()[0].as_str() {
            "exec" => Err(PlatformError::ProcessTimeout {
                command: cmd.display(),
                seconds: 5,
            }),
            _ => Ok(output(1, "")),
        });

        let err = docker
            .create_named_instance("repro-acl-1", IMAGE, "sleep 3600")
            .await
            .unwrap_err();
        assert!(matches!(err, SandboxError::StartFailed { .. }));

        let err = docker
            .exec_in_instance("repro-acl-1", "apt-get update", Some(Duration::from_secs(5)))
            .await
            .unwrap_err();
        match err {
            SandboxError::Timeout {
                sandbox,
                command,
                seconds,
            } => {
                assert_eq!(sandbox, "repro-acl-1");
                assert_eq!(command, "apt-get update");
                assert_eq!(seconds, 5);
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = docker.remove_instance("repro-acl-1").await.unwrap_err();
        assert!(matches!(err, SandboxError::TeardownFailed { .. }));

        let err = docker
            .build_image(IMAGE, std::path::Path::new("docker"))
            .await
            .unwrap_err();
        assert!(matches!(err, SandboxError::ImageBuildFailed { .. }));
    }
}

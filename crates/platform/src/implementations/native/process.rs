//! Process operations on the host

use async_trait::async_trait;
use repro_errors::PlatformError;
use repro_events::EventEmitter;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;

use crate::core::PlatformContext;
use crate::process::{CommandOutput, PlatformCommand, ProcessOperations};

/// Runs commands with `tokio::process`
#[derive(Debug, Default)]
pub struct NativeProcessOperations;

impl NativeProcessOperations {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessOperations for NativeProcessOperations {
    async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, PlatformError> {
        let start = Instant::now();
        let rendered = cmd.display();

        let mut command = Command::new(cmd.program());
        command
            .args(cmd.get_args())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        if let Some(dir) = cmd.get_current_dir() {
            command.current_dir(dir);
        }

        for (key, value) in cmd.get_env_vars() {
            command.env(key, value);
        }

        let output = command.output();
        let output = match cmd.get_timeout() {
            Some(limit) => tokio::time::timeout(limit, output).await.map_err(|_| {
                PlatformError::ProcessTimeout {
                    command: rendered.clone(),
                    seconds: limit.as_secs(),
                }
            })?,
            None => output.await,
        }
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PlatformError::CommandNotFound {
                command: cmd.program().to_string(),
            },
            _ => PlatformError::ProcessExecutionFailed {
                command: rendered.clone(),
                message: e.to_string(),
            },
        })?;

        ctx.emit_debug(format!(
            "{rendered} exited with {:?} after {}ms",
            output.status.code(),
            start.elapsed().as_millis()
        ));

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    async fn which(&self, program: &str) -> Result<PathBuf, PlatformError> {
        let not_found = || PlatformError::CommandNotFound {
            command: program.to_string(),
        };
        let path = std::env::var_os("PATH").ok_or_else(not_found)?;

        for dir in std::env::split_paths(&path) {
            let candidate = dir.join(program);
            if tokio::fs::metadata(&candidate)
                .await
                .is_ok_and(|meta| meta.is_file())
            {
                return Ok(candidate);
            }
        }

        Err(not_found())
    }
}

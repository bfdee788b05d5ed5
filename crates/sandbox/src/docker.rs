//! Docker CLI runtime

use async_trait::async_trait;
use repro_errors::SandboxError;
use repro_platform::{CommandOutput, Platform, PlatformContext};
use std::path::Path;
use std::time::Duration;

use crate::runtime::SandboxRuntime;

const DOCKER: &str = "docker";

/// Drives sandboxes through the `docker` command line
pub struct DockerRuntime {
    platform: Platform,
    ctx: PlatformContext,
}

impl DockerRuntime {
    #[must_use]
    pub fn new(platform: Platform, ctx: PlatformContext) -> Self {
        Self { platform, ctx }
    }

    /// Runtime using host processes
    #[must_use]
    pub fn on_host(ctx: PlatformContext) -> Self {
        Self::new(Platform::current(), ctx)
    }

    async fn docker<I, S>(
        &self,
        subject: &str,
        args: I,
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, SandboxError>
    where
        I: IntoIterator<Item = S> + Send,
        S: AsRef<str>,
    {
        let mut cmd = self.platform.command(DOCKER);
        cmd.args(args).timeout(timeout);
        let rendered = cmd.display();
        tracing::debug!(command = %rendered, "docker");

        self.platform
            .execute_command(&self.ctx, cmd)
            .await
            .map_err(|e| e.into_sandbox_error(subject, &rendered))
    }
}

#[async_trait]
impl SandboxRuntime for DockerRuntime {
    async fn image_exists(&self, image: &str) -> Result<bool, SandboxError> {
        let output = self.docker(image, ["images", "-q", image], None).await?;
        Ok(output.success() && !output.stdout_lossy().trim().is_empty())
    }

    async fn build_image(&self, tag: &str, context: &Path) -> Result<(), SandboxError> {
        let context = context.display().to_string();
        let output = self
            .docker(tag, ["build", "-t", tag, context.as_str()], None)
            .await
            .map_err(|e| SandboxError::ImageBuildFailed {
                image: tag.to_string(),
                message: e.to_string(),
            })?;

        if output.success() {
            Ok(())
        } else {
            Err(SandboxError::ImageBuildFailed {
                image: tag.to_string(),
                message: output.combined().trim().to_string(),
            })
        }
    }

    async fn create_named_instance(
        &self,
        name: &str,
        image: &str,
        init_command: &str,
    ) -> Result<String, SandboxError> {
        let name_arg = format!("--name={name}");
        let output = self
            .docker(
                name,
                ["run", name_arg.as_str(), "-d", image, "bash", "-c", init_command],
                None,
            )
            .await
            .map_err(|e| SandboxError::StartFailed {
                sandbox: name.to_string(),
                message: e.to_string(),
            })?;

        let id = output.stdout_lossy().trim().to_string();
        if output.success() && !id.is_empty() {
            Ok(id)
        } else {
            Err(SandboxError::StartFailed {
                sandbox: name.to_string(),
                message: output.combined().trim().to_string(),
            })
        }
    }

    async fn exec_in_instance(
        &self,
        name: &str,
        command: &str,
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, SandboxError> {
        self.docker(name, ["exec", name, "bash", "-c", command], timeout)
            .await
            .map_err(|e| match e {
                // report the in-sandbox command rather than the docker wrapper
                SandboxError::Timeout {
                    sandbox, seconds, ..
                } => SandboxError::Timeout {
                    sandbox,
                    command: command.to_string(),
                    seconds,
                },
                other => other,
            })
    }

    async fn remove_instance(&self, name: &str) -> Result<(), SandboxError> {
        let output = self
            .docker(name, ["rm", "-f", name], None)
            .await
            .map_err(|e| SandboxError::TeardownFailed {
                sandbox: name.to_string(),
                message: e.to_string(),
            })?;

        if output.success() {
            Ok(())
        } else {
            Err(SandboxError::TeardownFailed {
                sandbox: name.to_string(),
                message: output.combined().trim().to_string(),
            })
        }
    }
}

use async_trait::async_trait;
use repro_errors::SandboxError;
use repro_platform::CommandOutput;
use std::path::Path;
use std::time::Duration;

/// Container engine operations the pipeline relies on
#[async_trait]
pub trait SandboxRuntime: Send + Sync {
    /// Whether an image with this tag is present locally
    async fn image_exists(&self, image: &str) -> Result<bool, SandboxError>;

    /// Build `tag` from the Dockerfile in `context`
    async fn build_image(&self, tag: &str, context: &Path) -> Result<(), SandboxError>;

    /// Start a detached instance named `name` running `init_command`;
    /// returns the runtime's identifier for it
    async fn create_named_instance(
        &self,
        name: &str,
        image: &str,
        init_command: &str,
    ) -> Result<String, SandboxError>;

    /// Run a shell command inside the instance to completion.
    ///
    /// A non-zero exit is reported through the output, not as an error.
    async fn exec_in_instance(
        &self,
        name: &str,
        command: &str,
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, SandboxError>;

    /// Force-remove the instance
    async fn remove_instance(&self, name: &str) -> Result<(), SandboxError>;
}

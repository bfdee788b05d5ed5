//! Core platform abstractions and context management

use repro_errors::PlatformError;
use repro_events::{EventEmitter, EventSender};

use crate::implementations::native::NativeProcessOperations;
use crate::process::{CommandOutput, PlatformCommand, ProcessOperations};

/// Who is asking: the event channel plus the package a command runs for
#[derive(Clone, Default)]
pub struct PlatformContext {
    event_sender: Option<EventSender>,
    package: Option<String>,
}

impl PlatformContext {
    #[must_use]
    pub fn new(event_sender: Option<EventSender>) -> Self {
        Self {
            event_sender,
            package: None,
        }
    }

    /// Context scoped to one package; its events carry the package name
    #[must_use]
    pub fn with_package(event_sender: Option<EventSender>, package: &str) -> Self {
        Self {
            event_sender,
            package: Some(package.to_string()),
        }
    }

    #[must_use]
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }
}

impl EventEmitter for PlatformContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }

    fn scoped_package(&self) -> Option<&str> {
        self.package()
    }
}

/// Entry point to host operations
pub struct Platform {
    process_ops: Box<dyn ProcessOperations>,
}

impl Platform {
    #[must_use]
    pub fn new(process_ops: Box<dyn ProcessOperations>) -> Self {
        Self { process_ops }
    }

    /// Platform backed by real host processes
    #[must_use]
    pub fn current() -> Self {
        Self::new(Box::new(NativeProcessOperations::new()))
    }

    #[must_use]
    pub fn process(&self) -> &dyn ProcessOperations {
        &*self.process_ops
    }

    #[must_use]
    pub fn command(&self, program: &str) -> PlatformCommand {
        self.process().create_command(program)
    }

    /// Convenience method: execute a command and get its output
    ///
    /// # Errors
    ///
    /// Propagates spawn and timeout failures from the process implementation.
    pub async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, PlatformError> {
        self.process().execute_command(ctx, cmd).await
    }
}

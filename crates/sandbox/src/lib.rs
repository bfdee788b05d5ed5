#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Isolated build environments
//!
//! One sandbox per package: started from a prepared image, pinned to the
//! snapshot mirror, wired to the resolved snapshots, and removed when the
//! package is done. The container engine sits behind [`SandboxRuntime`].

mod docker;
mod log;
mod manager;
mod runtime;
mod simulated;

pub use docker::DockerRuntime;
pub use log::BuildLog;
pub use manager::{sandbox_name, shell_quote, source_lines, SandboxHandle, SandboxManager};
pub use runtime::SandboxRuntime;
pub use simulated::{DigestBehaviour, SimulatedRuntime};

pub use repro_platform::CommandOutput;

#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Host process execution
//!
//! Everything the pipeline runs on the host (the container runtime CLI in
//! particular) goes through [`ProcessOperations`], so sandbox code can be
//! exercised without spawning anything.

pub mod core;
pub mod implementations;
pub mod process;

pub use core::{Platform, PlatformContext};
pub use implementations::native::NativeProcessOperations;
pub use process::{CommandOutput, PlatformCommand, ProcessOperations};

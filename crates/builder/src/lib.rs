#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Package rebuilds inside a sandbox
//!
//! Installs the recorded build dependencies, fetches and builds the pinned
//! source version, hashes the produced artifact and measures the time spent.

mod cpu;
mod digest;
mod executor;
mod steps;

pub use cpu::{parse_cpu_stat, parse_cpuacct_stat, parse_proc_stat, CpuAccounting, CpuTimes};
pub use digest::{is_sha256_hex, parse_digest, round3, SHA256_HEX_LEN};
pub use executor::BuildExecutor;
pub use steps::{build_commands, hash_command};

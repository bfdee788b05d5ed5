//! Command line interface definition

use clap::Parser;
use repro_types::ColorChoice;
use std::path::PathBuf;

/// repro - rebuild archived packages and compare digests
#[derive(Parser, Debug)]
#[command(name = "repro")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Rebuild Debian packages against archive snapshots and check reproducibility")]
#[command(long_about = None)]
pub struct Cli {
    /// Package selection: required, essential, popular, random, random-fresh or cli
    #[arg(value_name = "MODE")]
    pub mode: String,

    /// Package to verify in `cli` mode
    #[arg(value_name = "PACKAGE")]
    pub package: Option<String>,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments
#[derive(Parser, Debug)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to the logs directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Where to write the result table
    #[arg(long, global = true, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Run against the simulated sandbox runtime; nothing is built
    #[arg(long, global = true)]
    pub simulate: bool,

    /// Parallel compile jobs inside the sandbox (0 = auto)
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,
}

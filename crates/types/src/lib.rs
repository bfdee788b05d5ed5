#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Data model shared by every pipeline stage: which packages to verify,
//! which archive snapshots to pin, what a build measured and how it was
//! classified.

pub mod outcome;
pub mod package;
pub mod package_sets;
pub mod snapshot;

pub use outcome::{BuildMeasurement, BuildResult, CpuSource, Outcome};
pub use package::PackageTarget;
pub use package_sets::PackageSet;
pub use snapshot::{SnapshotRef, SNAPSHOT_TIME_FORMAT};

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the run summary is printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Plain,
    #[default]
    Tty,
    Json,
}

/// When status lines and the summary table use ANSI colors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    #[default]
    Auto,
    Never,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as clap::ValueEnum>::from_str(s, true)
    }
}

impl FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as clap::ValueEnum>::from_str(s, true)
    }
}

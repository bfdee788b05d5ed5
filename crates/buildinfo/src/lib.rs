#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Build-report parsing
//!
//! The report service publishes, per package, an HTML page carrying the
//! original build time and a link to the `.buildinfo` text. The text is
//! scanned once, top to bottom, for the version, binary and source names,
//! the expected artifact checksum and the installed build dependencies.

mod page;
mod parser;
mod service;

pub use page::{parse_package_index, parse_package_page, PackagePage, BUILD_TIME_FORMAT};
pub use parser::{normalize_dependency, parse, BuildInfo, ParsePhase};
pub use service::{HttpReportService, ReportService};

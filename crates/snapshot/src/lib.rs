#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Archive snapshot resolution
//!
//! Given the time a package was originally built, pick the archive snapshots
//! a rebuild should install from: the two latest snapshots taken before the
//! build and the first one taken at or after it.

mod catalog;
mod resolver;
mod selection;

pub use catalog::{parse_listing, HttpSnapshotCatalog, SnapshotCatalog};
pub use resolver::SnapshotResolver;
pub use selection::{months_around, select_snapshots, SnapshotSelection, REQUIRED_SNAPSHOTS};

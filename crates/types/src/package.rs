//! Package target definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// A package queued for rebuild verification.
///
/// Only `name` is known when the pipeline starts; every other field is filled
/// from the package's build report. Fields the report does not provide stay
/// empty and are passed downstream as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageTarget {
    /// Source package name as queried
    pub name: String,
    /// Full version, possibly epoch-qualified (`2:1.3-4`)
    pub version: String,
    /// Version with the epoch stripped (`1.3-4`)
    pub short_version: String,
    /// Binary package chosen from the report's `Binary:` list
    pub binary_name: String,
    /// Value of the report's `Source:` field
    pub source_dir: String,
    /// `.deb` file name the expected checksum belongs to
    pub binary_filename: String,
    /// Expected SHA-256 digest of `binary_filename`
    pub expected_checksum: String,
    /// Expected size of `binary_filename` in bytes, as published
    pub expected_size: String,
    /// Normalized `Installed-Build-Depends` entries (`name=version`)
    pub build_depends: Vec<String>,
}

impl PackageTarget {
    /// Create a target with only the package name resolved
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Upstream part of the short version, i.e. everything before the first `-`
    #[must_use]
    pub fn upstream_version(&self) -> &str {
        self.short_version
            .split_once('-')
            .map_or(self.short_version.as_str(), |(upstream, _)| upstream)
    }

    /// Directory `apt-get source` unpacks into (`<source>-<upstream>/`)
    #[must_use]
    pub fn source_build_dir(&self) -> String {
        format!("{}-{}/", self.source_dir, self.upstream_version())
    }

    /// Version-pinned apt spec for the chosen binary (`<binary>=<version>`)
    #[must_use]
    pub fn pinned_spec(&self) -> String {
        format!("{}={}", self.binary_name, self.version)
    }
}

impl fmt::Display for PackageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} {}", self.name, self.version)
        }
    }
}

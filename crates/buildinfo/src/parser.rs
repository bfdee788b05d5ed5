//! `.buildinfo` text scanner

use repro_errors::ReportError;
use repro_types::PackageTarget;
use serde::{Deserialize, Serialize};

const VERSION_KEY: &str = "Version:";
const BINARY_KEY: &str = "Binary:";
const SOURCE_KEY: &str = "Source:";
const CHECKSUMS_MARKER: &str = "Checksums-Sha256:";
const DEPENDS_MARKER: &str = "Installed-Build-Depends:";

/// Where the scanner is in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePhase {
    /// Header fields and the checksum block
    Metadata,
    /// Everything after `Installed-Build-Depends:`; never left once entered
    Dependencies,
}

/// Fields extracted from one build report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub package: String,
    pub version: String,
    pub short_version: String,
    pub binary_name: String,
    pub source_dir: String,
    pub binary_filename: String,
    pub checksum: String,
    pub size: String,
    pub dependencies: Vec<String>,
    /// Whether the `Installed-Build-Depends:` marker was seen
    pub has_dependency_block: bool,
}

impl BuildInfo {
    /// Report which required fields the scan could not find.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::MalformedReport` listing the missing markers.
    pub fn validate(&self) -> Result<(), ReportError> {
        let mut missing = Vec::new();
        if self.version.is_empty() {
            missing.push(VERSION_KEY.trim_end_matches(':').to_string());
        }
        if self.binary_name.is_empty() {
            missing.push(BINARY_KEY.trim_end_matches(':').to_string());
        }
        if self.source_dir.is_empty() {
            missing.push(SOURCE_KEY.trim_end_matches(':').to_string());
        }
        if !self.has_dependency_block {
            missing.push(DEPENDS_MARKER.trim_end_matches(':').to_string());
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ReportError::MalformedReport {
                package: self.package.clone(),
                missing,
            })
        }
    }

    /// Copy the extracted fields onto a pipeline target
    pub fn apply_to(&self, target: &mut PackageTarget) {
        target.version.clone_from(&self.version);
        target.short_version.clone_from(&self.short_version);
        target.binary_name.clone_from(&self.binary_name);
        target.source_dir.clone_from(&self.source_dir);
        target.binary_filename.clone_from(&self.binary_filename);
        target.expected_checksum.clone_from(&self.checksum);
        target.expected_size.clone_from(&self.size);
        target.build_depends.clone_from(&self.dependencies);
    }
}

/// Scan a build report for the package queried as `package`.
///
/// Never fails: fields that cannot be found stay empty. Call
/// [`BuildInfo::validate`] to find out what was missing.
#[must_use]
pub fn parse(report: &str, package: &str) -> BuildInfo {
    let mut info = BuildInfo {
        package: package.to_string(),
        ..BuildInfo::default()
    };
    let mut phase = ParsePhase::Metadata;
    let mut in_checksums = false;

    for line in report.lines() {
        match phase {
            ParsePhase::Metadata => {
                let words: Vec<&str> = line.split_whitespace().collect();

                match words.as_slice() {
                    [key, version, ..] if *key == VERSION_KEY => {
                        info.version = (*version).to_string();
                        info.short_version = version
                            .split_once(':')
                            .map_or(*version, |(_, rest)| rest)
                            .to_string();
                    }
                    [key, first, rest @ ..] if *key == BINARY_KEY => {
                        info.binary_name = choose_binary(package, first, rest);
                    }
                    [key, source, ..] if *key == SOURCE_KEY => {
                        info.source_dir = (*source).to_string();
                    }
                    _ => {}
                }

                if in_checksums {
                    if let [checksum, size, file, ..] = words.as_slice() {
                        let stem = format!("{}_{}", info.binary_name, info.short_version);
                        if file.contains(&stem) && file.contains(".deb") {
                            info.checksum = (*checksum).to_string();
                            info.size = (*size).to_string();
                            info.binary_filename = (*file).to_string();
                            in_checksums = false;
                        }
                    }
                }

                let marker = line.trim_end();
                if marker == CHECKSUMS_MARKER {
                    in_checksums = true;
                } else if marker == DEPENDS_MARKER {
                    info.has_dependency_block = true;
                    phase = ParsePhase::Dependencies;
                }
            }
            ParsePhase::Dependencies => {
                let dependency = normalize_dependency(line);
                if !dependency.is_empty() {
                    info.dependencies.push(dependency);
                }
            }
        }
    }

    info
}

/// Prefer the queried name, then `<name>1`, then the first listed binary
fn choose_binary(package: &str, first: &str, rest: &[&str]) -> String {
    let listed = || std::iter::once(first).chain(rest.iter().copied());
    if listed().any(|b| b == package) {
        package.to_string()
    } else {
        let numbered = format!("{package}1");
        if listed().any(|b| b == numbered) {
            numbered
        } else {
            first.to_string()
        }
    }
}

/// Turn one `Installed-Build-Depends` line into an apt install spec.
///
/// ` acl (= 2.2.52-3),` becomes `acl=2.2.52-3`.
#[must_use]
pub fn normalize_dependency(line: &str) -> String {
    line.chars()
        .filter(|c| !matches!(c, ' ' | '(' | ')'))
        .map(|c| if c == ',' { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

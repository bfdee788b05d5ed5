#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for repro
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/repro/config.toml)
//! - Environment variables
//! - CLI flags (applied by the CLI)

pub mod constants;

use repro_errors::{ConfigError, Error};
use repro_types::{ColorChoice, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub mirror: MirrorConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub sandbox: SandboxConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub paths: PathConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    #[serde(default = "default_color_choice")]
    pub color: ColorChoice,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64, // seconds
}

/// Snapshot archive mirror
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Base URL of the snapshot service
    #[serde(default = "default_mirror_url")]
    pub url: String,
    /// Archive name below `/archive/`
    #[serde(default = "default_archive")]
    pub archive: String,
    /// Host name pinned inside the sandbox
    #[serde(default = "default_mirror_host")]
    pub host: String,
    /// Address the pinned host name resolves to
    #[serde(default = "default_mirror_ip")]
    pub ip: String,
    #[serde(default = "default_suite")]
    pub suite: String,
    #[serde(default = "default_component")]
    pub component: String,
}

/// Build-report publishing service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_url")]
    pub url: String,
    /// Path of the per-package report pages, relative to `url`
    #[serde(default = "default_report_path")]
    pub package_path: String,
    /// Path of the index of reproducible packages, relative to `url`
    #[serde(default = "default_index_path")]
    pub index_path: String,
    /// Packages sampled in `random-fresh` mode
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
}

/// Sandbox runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxConfig {
    #[serde(default = "default_runtime")]
    pub runtime: RuntimeKind,
    #[serde(default = "default_image")]
    pub image: String,
    /// Directory holding the image's Dockerfile
    #[serde(default = "default_image_context")]
    pub image_context: PathBuf,
    #[serde(default = "default_init_command")]
    pub init_command: String,
    /// Pause after starting an instance, in milliseconds
    #[serde(default = "default_startup_delay_ms")]
    pub startup_delay_ms: u64,
    /// Per-command timeout in seconds; 0 disables the limit
    #[serde(default)]
    pub command_timeout_secs: u64,
    /// Root of the host cgroup hierarchy
    #[serde(default = "default_cgroup_root")]
    pub cgroup_root: PathBuf,
    /// Whether the simulated runtime reproduces the expected digest
    #[serde(default)]
    pub simulate_success: bool,
}

/// Which sandbox runtime drives the builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeKind {
    Docker,
    Simulated,
}

/// Build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_build_jobs")]
    pub jobs: usize, // 0 = auto-detect
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    pub logs_dir: Option<PathBuf>,
    pub results_csv: Option<PathBuf>,
}

// Default implementations

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: OutputFormat::Tty,
            color: ColorChoice::Auto,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            retries: default_retries(),
            retry_delay: default_retry_delay(),
        }
    }
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            url: default_mirror_url(),
            archive: default_archive(),
            host: default_mirror_host(),
            ip: default_mirror_ip(),
            suite: default_suite(),
            component: default_component(),
        }
    }
}

impl SandboxConfig {
    /// Per-command timeout; `None` when `command_timeout_secs` is 0
    #[must_use]
    pub fn command_timeout(&self) -> Option<Duration> {
        (self.command_timeout_secs > 0).then(|| Duration::from_secs(self.command_timeout_secs))
    }

    #[must_use]
    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }
}

impl MirrorConfig {
    /// Base URL of the archive, ending in `/`, to which snapshot tokens are appended
    #[must_use]
    pub fn archive_url(&self) -> String {
        format!("{}/archive/{}/", self.url.trim_end_matches('/'), self.archive)
    }
}

impl ReportConfig {
    /// URL of a package's report page
    #[must_use]
    pub fn package_page_url(&self, package: &str) -> String {
        format!("{}/{package}.html", join_url(&self.url, &self.package_path))
    }

    /// URL of a page referenced by a site-relative link on the report service
    #[must_use]
    pub fn resolve_link(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else {
            join_url(&self.url, href)
        }
    }

    #[must_use]
    pub fn index_url(&self) -> String {
        join_url(&self.url, &self.index_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/').trim_end_matches('/')
    )
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            url: default_report_url(),
            package_path: default_report_path(),
            index_path: default_index_path(),
            sample_size: default_sample_size(),
        }
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            runtime: default_runtime(),
            image: default_image(),
            image_context: default_image_context(),
            init_command: default_init_command(),
            startup_delay_ms: default_startup_delay_ms(),
            command_timeout_secs: 0,
            cgroup_root: default_cgroup_root(),
            simulate_success: false,
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            jobs: default_build_jobs(),
        }
    }
}

// Default value functions for serde
fn default_output_format() -> OutputFormat {
    OutputFormat::Tty
}

fn default_color_choice() -> ColorChoice {
    ColorChoice::Auto
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1 // 1 second
}

fn default_mirror_url() -> String {
    constants::SNAPSHOT_URL.to_string()
}

fn default_archive() -> String {
    "debian".to_string()
}

fn default_mirror_host() -> String {
    constants::SNAPSHOT_HOST.to_string()
}

fn default_mirror_ip() -> String {
    constants::SNAPSHOT_IP.to_string()
}

fn default_suite() -> String {
    "stretch".to_string()
}

fn default_component() -> String {
    "main".to_string()
}

fn default_report_url() -> String {
    constants::REPORT_URL.to_string()
}

fn default_report_path() -> String {
    "debian/rb-pkg/testing/amd64".to_string()
}

fn default_index_path() -> String {
    "debian/testing/amd64/index_reproducible.html".to_string()
}

fn default_sample_size() -> usize {
    3
}

fn default_runtime() -> RuntimeKind {
    RuntimeKind::Docker
}

fn default_image() -> String {
    "repro_build".to_string()
}

fn default_image_context() -> PathBuf {
    PathBuf::from("docker")
}

fn default_init_command() -> String {
    "sleep 3600".to_string()
}

fn default_startup_delay_ms() -> u64 {
    1000
}

fn default_cgroup_root() -> PathBuf {
    PathBuf::from(constants::CGROUP_ROOT)
}

fn default_build_jobs() -> usize {
    0 // 0 = auto-detect
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("repro").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Unreadable {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::Malformed {
                path: path.display().to_string(),
                message: e.message().to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let Ok(config_path) = Self::default_path() else {
            tracing::debug!("no config directory on this system, using defaults");
            return Ok(Self::default());
        };

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Some(output) = env_override("REPRO_OUTPUT")? {
            self.general.default_output = output;
        }
        if let Some(color) = env_override("REPRO_COLOR")? {
            self.general.color = color;
        }
        if let Some(jobs) = env_override("REPRO_BUILD_JOBS")? {
            self.build.jobs = jobs;
        }
        if let Some(timeout) = env_override("REPRO_COMMAND_TIMEOUT")? {
            self.sandbox.command_timeout_secs = timeout;
        }

        if let Ok(url) = std::env::var("REPRO_MIRROR_URL") {
            self.mirror.url = url;
        }

        if let Ok(url) = std::env::var("REPRO_REPORT_URL") {
            self.report.url = url;
        }

        if let Ok(image) = std::env::var("REPRO_SANDBOX_IMAGE") {
            self.sandbox.image = image;
        }

        Ok(())
    }

    /// Get the build log directory (with default)
    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.paths
            .logs_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(constants::LOGS_DIR))
    }

    /// Get the results table path (with default)
    #[must_use]
    pub fn results_csv(&self) -> PathBuf {
        self.paths
            .results_csv
            .clone()
            .unwrap_or_else(|| PathBuf::from(constants::RESULTS_CSV))
    }
}

/// Calculate build jobs based on CPU count
#[must_use]
pub fn calculate_build_jobs(config_value: usize) -> usize {
    if config_value > 0 {
        config_value // User override
    } else {
        let cpus = num_cpus::get();

        // Use 75% of CPUs for builds, minimum 1
        (cpus * 3 / 4).max(1)
    }
}

/// Parse `REPRO_*` variable `var` if it is set
fn env_override<T: FromStr>(var: &str) -> Result<Option<T>, ConfigError> {
    let Ok(value) = std::env::var(var) else {
        return Ok(None);
    };
    match value.trim().parse() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => Err(ConfigError::BadOverride {
            var: var.to_string(),
            value,
        }),
    }
}

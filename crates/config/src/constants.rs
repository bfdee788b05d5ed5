//! Fixed endpoints and paths for repro
//!
//! These are the defaults for the public Debian snapshot and
//! reproducible-builds services. All of them can be overridden in the config.

pub const SNAPSHOT_URL: &str = "http://snapshot.debian.org";
pub const SNAPSHOT_HOST: &str = "snapshot.debian.org";
pub const SNAPSHOT_IP: &str = "193.62.202.30";

pub const REPORT_URL: &str = "https://tests.reproducible-builds.org";

pub const CGROUP_ROOT: &str = "/sys/fs/cgroup";

pub const LOGS_DIR: &str = "logs";
pub const RESULTS_CSV: &str = "reprotest.csv";

//! CPU time accounting for sandboxed builds

use repro_types::CpuSource;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Kernel clock ticks per second as reported in `cpuacct.stat` and `/proc/stat`
const USER_HZ: f64 = 100.0;

const PROC_STAT: &str = "/proc/stat";

/// User and system CPU seconds
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CpuTimes {
    pub user: f64,
    pub system: f64,
}

impl CpuTimes {
    /// Component-wise `self - earlier`, clamped at zero
    #[must_use]
    pub fn since(self, earlier: Self) -> Self {
        Self {
            user: (self.user - earlier.user).max(0.0),
            system: (self.system - earlier.system).max(0.0),
        }
    }
}

/// Parse cgroup v1 `cpuacct.stat` (`user <ticks>` / `system <ticks>`)
#[must_use]
pub fn parse_cpuacct_stat(text: &str) -> Option<CpuTimes> {
    let user = field(text, "user")?;
    let system = field(text, "system")?;
    Some(CpuTimes {
        user: user / USER_HZ,
        system: system / USER_HZ,
    })
}

/// Parse cgroup v2 `cpu.stat` (`user_usec` / `system_usec`)
#[must_use]
pub fn parse_cpu_stat(text: &str) -> Option<CpuTimes> {
    let user = field(text, "user_usec")?;
    let system = field(text, "system_usec")?;
    Some(CpuTimes {
        user: user / 1e6,
        system: system / 1e6,
    })
}

/// Parse the aggregate `cpu` line of `/proc/stat`.
///
/// `user` includes `nice`; values are in clock ticks.
#[must_use]
pub fn parse_proc_stat(text: &str) -> Option<CpuTimes> {
    let line = text
        .lines()
        .find(|line| line.split_whitespace().next() == Some("cpu"))?;
    let values: Vec<f64> = line
        .split_whitespace()
        .skip(1)
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;

    match values.as_slice() {
        [user, nice, system, ..] => Some(CpuTimes {
            user: (user + nice) / USER_HZ,
            system: system / USER_HZ,
        }),
        _ => None,
    }
}

fn field(text: &str, key: &str) -> Option<f64> {
    text.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        (parts.next()? == key).then_some(())?;
        parts.next()?.parse().ok()
    })
}

/// Where CPU figures for a sandbox instance are read from
#[derive(Debug, Clone)]
pub struct CpuAccounting {
    cgroup_root: PathBuf,
    proc_stat: PathBuf,
}

impl CpuAccounting {
    #[must_use]
    pub fn new(cgroup_root: impl Into<PathBuf>) -> Self {
        Self {
            cgroup_root: cgroup_root.into(),
            proc_stat: PathBuf::from(PROC_STAT),
        }
    }

    /// Read host counters from `path` instead of `/proc/stat`
    #[must_use]
    pub fn with_proc_stat(mut self, path: impl Into<PathBuf>) -> Self {
        self.proc_stat = path.into();
        self
    }

    #[must_use]
    pub fn cgroup_v1_path(&self, instance_id: &str) -> PathBuf {
        self.cgroup_root
            .join("cpuacct")
            .join("docker")
            .join(instance_id)
            .join("cpuacct.stat")
    }

    #[must_use]
    pub fn cgroup_v2_path(&self, instance_id: &str) -> PathBuf {
        self.cgroup_root
            .join("system.slice")
            .join(format!("docker-{instance_id}.scope"))
            .join("cpu.stat")
    }

    /// Host-wide counters, if the host exposes them
    pub async fn host_sample(&self) -> Option<CpuTimes> {
        read_with(&self.proc_stat, parse_proc_stat).await
    }

    /// CPU used by the instance, falling back to the host delta since
    /// `host_start`.
    ///
    /// Returns zero with [`CpuSource::Unavailable`] when nothing can be read.
    pub async fn measure(
        &self,
        instance_id: &str,
        host_start: Option<CpuTimes>,
    ) -> (CpuTimes, CpuSource) {
        if !instance_id.is_empty() {
            if let Some(times) =
                read_with(&self.cgroup_v1_path(instance_id), parse_cpuacct_stat).await
            {
                return (times, CpuSource::Cgroup);
            }
            if let Some(times) = read_with(&self.cgroup_v2_path(instance_id), parse_cpu_stat).await
            {
                return (times, CpuSource::Cgroup);
            }
        }

        if let (Some(start), Some(end)) = (host_start, self.host_sample().await) {
            return (end.since(start), CpuSource::Host);
        }

        (CpuTimes::default(), CpuSource::Unavailable)
    }
}

async fn read_with(path: &Path, parse: fn(&str) -> Option<CpuTimes>) -> Option<CpuTimes> {
    let text = fs::read_to_string(path).await.ok()?;
    let times = parse(&text);
    if times.is_none() {
        tracing::debug!(path = %path.display(), "unrecognised cpu accounting file");
    }
    times
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cpuacct_stat() {
        let times = parse_cpuacct_stat("user 12345\nsystem 678\n").unwrap();
        assert!((times.user - 123.45).abs() < 1e-9);
        assert!((times.system - 6.78).abs() < 1e-9);
    }

    #[test]
    fn test_parse_cpu_stat() {
        let text = "usage_usec 3000000\nuser_usec 2500000\nsystem_usec 500000\nnr_periods 0\n";
        let times = parse_cpu_stat(text).unwrap();
        assert!((times.user - 2.5).abs() < 1e-9);
        assert!((times.system - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_proc_stat_uses_aggregate_line() {
        let text = "cpu  100 20 50 9000 10 0 3 0 0 0\ncpu0 50 10 25 4500 5 0 1 0 0 0\nintr 1\n";
        let times = parse_proc_stat(text).unwrap();
        assert!((times.user - 1.2).abs() < 1e-9);
        assert!((times.system - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_cpuacct_stat("user abc\nsystem 1\n").is_none());
        assert!(parse_cpu_stat("usage_usec 1\n").is_none());
        assert!(parse_proc_stat("cpu0 1 2 3\n").is_none());
    }

    #[test]
    fn test_since_clamps_at_zero() {
        let earlier = CpuTimes {
            user: 5.0,
            system: 1.0,
        };
        let later = CpuTimes {
            user: 7.5,
            system: 0.5,
        };
        assert_eq!(
            later.since(earlier),
            CpuTimes {
                user: 2.5,
                system: 0.0
            }
        );
    }

    #[test]
    fn test_cgroup_paths() {
        let accounting = CpuAccounting::new("/sys/fs/cgroup");
        assert_eq!(
            accounting.cgroup_v1_path("abc"),
            PathBuf::from("/sys/fs/cgroup/cpuacct/docker/abc/cpuacct.stat")
        );
        assert_eq!(
            accounting.cgroup_v2_path("abc"),
            PathBuf::from("/sys/fs/cgroup/system.slice/docker-abc.scope/cpu.stat")
        );
    }
}

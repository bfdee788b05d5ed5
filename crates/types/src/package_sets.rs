//! Package selection modes
//!
//! The fixed lists mirror the sets used when the pipeline was first run
//! against Debian stretch: the `required` priority set, a handful of
//! `essential` packages, popular packages from popcon, and a random sample.

use repro_errors::OpsError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const REQUIRED: &[&str] = &[
    "acl",
    "attr",
    "base-files",
    "base-passwd",
    "coreutils",
    "debconf",
    "debianutils",
    "diffutils",
    "dpkg",
    "e2fsprogs",
    "findutils",
    "grep",
    "gzip",
    "init-system-helpers",
    "libselinux",
    "libsepol",
    "lsb",
    "mawk",
    "pam",
    "pcre3",
    "sed",
    "sysvinit",
    "tar",
    "tzdata",
    "util-linux",
    "zlib",
];

pub const ESSENTIAL: &[&str] = &[
    "debianutils",
    "diffutils",
    "e2fsprogs",
    "findutils",
    "perl",
    "sysvinit",
    "tar",
];

pub const POPULAR: &[&str] = &[
    "hostname",
    "netbase",
    "adduser",
    "tzdata",
    "bsdmainutils",
    "cpio",
    "logrotate",
    "debian-archive-keyring",
    "liblocale-gettext-perl",
    "net-tools",
    "ucf",
    "popularity-contest",
    "cron",
    "manpages",
    "libtext-wrapi18n-perl",
    "iptables",
    "ifupdown",
    "man-db",
    "mime-support",
    "pciutils",
    "libxml2",
    "initramfs-tools",
    "libcap2",
    "dmidecode",
    "busybox",
    "file",
    "less",
    "ca-certificates",
    "psmisc",
    "nano",
    "tasksel",
    "insserv",
    "installation-report",
    "laptop-detect",
    "linux-base",
    "xml-core",
    "aptitude",
    "bzip2",
    "os-prober",
    "acpid",
    "discover-data",
    "bash-completion",
    "dictionaries-common",
    "eject",
    "kmod",
    "whois",
    "iso-codes",
    "geoip-database",
    "bc",
    "acpi",
];

pub const RANDOM: &[&str] = &[
    "golang-github-hlandau-xlog",
    "cal",
    "libpath-dispatcher-declarative-perl",
    "lunar-date",
    "pmailq",
    "aolserver4-nsxml",
    "node-tilelive-vector",
    "golang-github-hashicorp-go-getter",
    "yacpi",
    "libdata-stag-perl",
    "libnet-oauth2-perl",
    "libjs-jquery-dotdotdot",
    "libclass-c3-adopt-next-perl",
    "libobject-remote-perl",
    "libxml-rsslite-perl",
    "python-click-log",
    "cl-salza2",
    "globus-ftp-control",
    "childsplay-alphabet-sounds-sl",
    "fgetty",
    "xmlextras",
    "node-superagent",
    "django-memoize",
    "libtemplate-plugin-stash-perl",
    "systraq",
    "libtpl",
    "libdist-zilla-plugin-config-git-perl",
    "php-doctrine-cache-bundle",
    "tz-converter",
    "hackrf",
    "slice",
    "xfce4-taskmanager",
    "sshfs-fuse",
    "node-simplesmtp",
    "visionegg",
    "haskell-mutable-containers",
    "gvfs",
    "qdacco",
    "haskell-ghc-events",
    "ply",
    "dymo-cups-drivers",
    "ruby-bacon",
    "liblinux-usermod-perl",
    "puppet-module-puppetlabs-postgresql",
    "jalview",
    "masscan",
    "octave-gsl",
    "geronimo-ejb-3.2-spec",
    "haskell-pcap",
    "exuberant-ctags",
];

/// Which packages enter the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "mode", content = "package")]
pub enum PackageSet {
    Required,
    Essential,
    Popular,
    Random,
    /// Sampled from the live index of reproducible packages at run time
    RandomFresh,
    /// A single ad-hoc package
    Cli(String),
}

impl PackageSet {
    /// Build a selection from the mode name and optional package argument
    ///
    /// # Errors
    ///
    /// Returns `OpsError::UnknownPackageSet` for an unknown mode and
    /// `OpsError::NoPackagesSpecified` when `cli` is given without a package.
    pub fn from_mode(mode: &str, package: Option<&str>) -> Result<Self, OpsError> {
        match mode {
            "required" => Ok(Self::Required),
            "essential" => Ok(Self::Essential),
            "popular" => Ok(Self::Popular),
            "random" => Ok(Self::Random),
            "random-fresh" | "random_fresh" => Ok(Self::RandomFresh),
            "cli" => package
                .filter(|p| !p.trim().is_empty())
                .map(|p| Self::Cli(p.trim().to_string()))
                .ok_or(OpsError::NoPackagesSpecified),
            other => Err(OpsError::UnknownPackageSet {
                name: other.to_string(),
            }),
        }
    }

    /// Packages of a fixed selection; `None` for `RandomFresh`, which needs
    /// the live index.
    #[must_use]
    pub fn fixed_packages(&self) -> Option<Vec<String>> {
        let list: &[&str] = match self {
            Self::Required => REQUIRED,
            Self::Essential => ESSENTIAL,
            Self::Popular => POPULAR,
            Self::Random => RANDOM,
            Self::RandomFresh => return None,
            Self::Cli(name) => return Some(vec![name.clone()]),
        };
        Some(list.iter().map(|p| (*p).to_string()).collect())
    }

    /// Mode name as accepted on the command line
    #[must_use]
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Essential => "essential",
            Self::Popular => "popular",
            Self::Random => "random",
            Self::RandomFresh => "random-fresh",
            Self::Cli(_) => "cli",
        }
    }
}

impl fmt::Display for PackageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cli(name) => write!(f, "cli/{name}"),
            other => write!(f, "{}", other.mode()),
        }
    }
}

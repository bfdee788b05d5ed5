//! Configuration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("this system has no user config directory")]
    NoConfigDir,

    #[error("cannot read config file {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("malformed config file {path}: {message}")]
    Malformed { path: String, message: String },

    #[error("{var}={value:?} is not a valid override")]
    BadOverride { var: String, value: String },
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NoConfigDir => Some("Pass --config with an explicit path."),
            Self::Unreadable { .. } => {
                Some("Check the --config path, or drop the flag to run with defaults.")
            }
            Self::Malformed { .. } => Some("The config file must be valid TOML."),
            Self::BadOverride { .. } => Some("Unset the REPRO_* variable or give it a valid value."),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::NoConfigDir => "config.no_dir",
            Self::Unreadable { .. } => "config.unreadable",
            Self::Malformed { .. } => "config.malformed",
            Self::BadOverride { .. } => "config.bad_override",
        })
    }
}

//! CLI error handling

use std::fmt;

use repro_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration error
    Config(repro_errors::ConfigError),
    /// Operations error
    Ops(repro_errors::Error),
    /// Invalid command arguments
    InvalidArguments(String),
    /// I/O error
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {e}"),
            CliError::Ops(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Ops(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::InvalidArguments(_) => None,
        }
    }
}

impl From<repro_errors::ConfigError> for CliError {
    fn from(e: repro_errors::ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<repro_errors::Error> for CliError {
    fn from(e: repro_errors::Error) -> Self {
        CliError::Ops(e)
    }
}

impl From<repro_errors::OpsError> for CliError {
    fn from(e: repro_errors::OpsError) -> Self {
        match e {
            repro_errors::OpsError::NoPackagesSpecified => {
                CliError::InvalidArguments("cli mode needs a package name".to_string())
            }
            repro_errors::OpsError::UnknownPackageSet { name } => CliError::InvalidArguments(
                format!("unknown mode '{name}': expected required, essential, popular, random, random-fresh or cli"),
            ),
            other => CliError::Ops(other.into()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

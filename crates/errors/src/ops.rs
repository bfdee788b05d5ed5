//! Operation orchestration error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum OpsError {
    #[error("no packages specified")]
    NoPackagesSpecified,

    #[error("unknown package set: {name}")]
    UnknownPackageSet { name: String },

    #[error("missing component: {component}")]
    MissingComponent { component: String },

    #[error("failed to write results to {path}: {message}")]
    ResultsWriteFailed { path: String, message: String },

    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

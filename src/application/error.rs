//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::{ConfigError, DomainError, StructureError};

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("hierarchy has no layout yet")]
    NotLaidOut,

    #[error("config error: {message}")]
    Config { message: String },
}

impl From<StructureError> for ApplicationError {
    fn from(e: StructureError) -> Self {
        Self::Domain(e.into())
    }
}

impl From<ConfigError> for ApplicationError {
    fn from(e: ConfigError) -> Self {
        Self::Domain(e.into())
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

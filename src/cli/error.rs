//! CLI-level errors (wraps infrastructure errors)

use std::io;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        Self::Infra(e.into())
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                    crate::exitcode::NOINPUT
                }
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Json { .. } | InfraError::InvalidInput { .. } => {
                    crate::exitcode::DATAERR
                }
                InfraError::Application(app) => match app {
                    ApplicationError::Domain(DomainError::Structure(_)) => crate::exitcode::DATAERR,
                    ApplicationError::Domain(DomainError::Config(_))
                    | ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::NotLaidOut => crate::exitcode::SOFTWARE,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConfigError, StructureError};
    use rstest::rstest;

    #[rstest]
    #[case(CliError::Usage("x".into()), crate::exitcode::USAGE)]
    #[case(
        CliError::from(ApplicationError::from(StructureError::DuplicateId("a".into()))),
        crate::exitcode::DATAERR
    )]
    #[case(
        CliError::from(ApplicationError::from(ConfigError::NonPositiveExtent { axis: "width", extent: -1.0 })),
        crate::exitcode::CONFIG
    )]
    #[case(
        CliError::Infra(InfraError::io("open", io::Error::from(io::ErrorKind::NotFound))),
        crate::exitcode::NOINPUT
    )]
    #[case(
        CliError::Infra(InfraError::io("read", io::Error::from(io::ErrorKind::PermissionDenied))),
        crate::exitcode::IOERR
    )]
    fn given_error_when_mapping_then_sysexits_code(#[case] error: CliError, #[case] expected: i32) {
        assert_eq!(error.exit_code(), expected);
    }
}

//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),

    #[error("{invalid} of {total} tree file(s) failed validation")]
    ValidationFailed { invalid: usize, total: usize },
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => exitcode::USAGE,
            CliError::ValidationFailed { .. } => exitcode::DATAERR,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => exitcode::IOERR,
                InfraError::Application(app) => match app {
                    ApplicationError::InvalidTree { .. }
                    | ApplicationError::Parse { .. }
                    | ApplicationError::UnsupportedFormat(_) => exitcode::DATAERR,
                    ApplicationError::NotFound(_) => exitcode::NOINPUT,
                    ApplicationError::Config { .. } => exitcode::CONFIG,
                    ApplicationError::OperationFailed { .. } => exitcode::IOERR,
                    ApplicationError::Domain(_) => exitcode::SOFTWARE,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn given_errors_when_mapping_exit_codes_then_follow_sysexits() {
        assert_eq!(
            CliError::ValidationFailed { invalid: 1, total: 3 }.exit_code(),
            exitcode::DATAERR
        );
        assert_eq!(CliError::Usage("x".into()).exit_code(), exitcode::USAGE);
        assert_eq!(
            CliError::from(ApplicationError::NotFound(PathBuf::from("t.json"))).exit_code(),
            exitcode::NOINPUT
        );
        assert_eq!(
            CliError::from(ApplicationError::Config {
                message: "bad".into()
            })
            .exit_code(),
            exitcode::CONFIG
        );
    }
}

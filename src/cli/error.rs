//! CLI-level errors (wraps infrastructure errors)

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

    #[error("{0}")]
    Usage(String),
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
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(app) => match app {
                    ApplicationError::Domain(DomainError::DuplicateRule(_))
                    | ApplicationError::Domain(DomainError::MissingSpec(_))
                    | ApplicationError::Domain(DomainError::InvalidRule { .. }) => {
                        crate::exitcode::DATAERR
                    }
                    ApplicationError::NoRulesFound(_) => crate::exitcode::NOINPUT,
                    ApplicationError::UnknownRule(_) => crate::exitcode::USAGE,
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
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
    fn given_malformed_rule_when_mapping_exit_code_then_data_error() {
        let err = CliError::from(ApplicationError::Domain(DomainError::MissingSpec(
            PathBuf::from("x.crysl"),
        )));
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_missing_rules_when_mapping_exit_code_then_no_input() {
        let err = CliError::from(ApplicationError::NoRulesFound(PathBuf::from("rules")));
        assert_eq!(err.exit_code(), crate::exitcode::NOINPUT);
    }

    #[test]
    fn given_usage_error_when_mapping_exit_code_then_usage() {
        assert_eq!(
            CliError::Usage("no rules directory".into()).exit_code(),
            crate::exitcode::USAGE
        );
    }
}

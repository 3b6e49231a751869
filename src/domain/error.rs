//! Domain-level errors (no external dependencies)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::RuleId;

/// Domain errors represent rule data that cannot be documented.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("duplicate rule: {0}")]
    DuplicateRule(RuleId),

    #[error("missing SPEC section: {}", .0.display())]
    MissingSpec(PathBuf),

    #[error("invalid rule {}: {message}", path.display())]
    InvalidRule { path: PathBuf, message: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the tree and document model.
/// These are independent of transport concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("duplicate node url in tree: {0}")]
    DuplicateUrl(String),

    #[error("cannot parse document: {message}")]
    Parse { message: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::api::ApiError;

/// Application errors wrap domain errors and add backend context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("backend unavailable: {context}")]
    Network {
        context: String,
        #[source]
        source: ApiError,
    },

    #[error("unexpected backend response: {context}")]
    Decode {
        context: String,
        #[source]
        source: ApiError,
    },

    #[error("tree has not been synced yet")]
    NotSynced,

    #[error("config error: {message}")]
    Config { message: String },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

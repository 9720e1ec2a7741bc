//! Error conversion helpers for backend calls
//!
//! Provides an extension trait for cleaner error handling with request context.

use crate::application::{ApplicationError, ApplicationResult};
use crate::infrastructure::api::{ApiError, ApiResult};

/// Extension trait for converting `ApiResult` to `ApplicationResult` with context.
pub trait ApiResultExt<T> {
    /// Add request context to a backend error.
    ///
    /// # Example
    /// ```ignore
    /// let root = self.api.tree().with_request_context("sync tree")?;
    /// ```
    fn with_request_context(self, action: &str) -> ApplicationResult<T>;
}

impl<T> ApiResultExt<T> for ApiResult<T> {
    fn with_request_context(self, action: &str) -> ApplicationResult<T> {
        self.map_err(|e| match e {
            ApiError::Decode { .. } => ApplicationError::Decode {
                context: action.to_string(),
                source: e,
            },
            ApiError::Network { .. } | ApiError::Status { .. } => ApplicationError::Network {
                context: action.to_string(),
                source: e,
            },
        })
    }
}

//! Error types for coordinated requests.

use thiserror::Error;

/// Error type returned by coordinated operations.
pub type OperationError = crate::registry::BoxError;

/// Outcome of a [`PendingRequest`](super::PendingRequest) that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The request was superseded or explicitly canceled
    #[error("request was canceled")]
    Canceled,

    /// The operation itself failed
    #[error("request failed: {message}")]
    Failed { message: String },
}

impl RequestError {
    pub fn is_canceled(&self) -> bool {
        matches!(self, RequestError::Canceled)
    }
}

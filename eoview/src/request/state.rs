//! Loading state of a coordinated request.

use std::fmt;

/// Observable status of an [`AsyncRequestCoordinator`](super::AsyncRequestCoordinator).
///
/// ```text
/// Init ──► Loading ──► Success
///             ▲   └──► Error
///             └────────┘ (next dispatch)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadingState {
    /// Nothing has been dispatched yet
    #[default]
    Init,
    /// An operation is in flight
    Loading,
    /// The last operation completed
    Success,
    /// The last operation failed
    Error { message: String },
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading)
    }

    /// Returns true for `Success` and `Error`.
    pub fn is_settled(&self) -> bool {
        matches!(self, LoadingState::Success | LoadingState::Error { .. })
    }

    /// Error message, if the last operation failed.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            LoadingState::Error { message } => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for LoadingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadingState::Init => write!(f, "init"),
            LoadingState::Loading => write!(f, "loading"),
            LoadingState::Success => write!(f, "success"),
            LoadingState::Error { message } => write!(f, "error: {}", message),
        }
    }
}

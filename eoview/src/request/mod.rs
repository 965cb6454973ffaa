//! Async request coordination.
//!
//! [`AsyncRequestCoordinator`] wraps an async operation so that at most one
//! invocation is outstanding, newer calls strictly supersede older ones, and
//! an optional trailing debounce collapses bursts into a single invocation.
//! Progress is published as a [`LoadingState`].
//!
//! # Example
//!
//! ```ignore
//! use eoview::request::AsyncRequestCoordinator;
//!
//! let coordinator = AsyncRequestCoordinator::new(|bbox, token| async move {
//!     fetch_statistics(bbox, token).await
//! })
//! .with_debounce(Duration::from_millis(250));
//!
//! let stats = coordinator.fetch_data(viewport_bbox).await?;
//! ```

mod coordinator;
mod error;
mod state;

pub use coordinator::{AsyncRequestCoordinator, PendingRequest, RequestId, RequestStats};
pub use error::{OperationError, RequestError};
pub use state::LoadingState;

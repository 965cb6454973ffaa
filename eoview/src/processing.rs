//! Data processing objects.
//!
//! A [`DataProcessing`] fetches derived data (statistics, time series,
//! histograms) for the current view through an [`AsyncRequestCoordinator`]
//! and keeps the most recent successful result for display.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::config::RequestConfig;
use crate::request::{
    AsyncRequestCoordinator, LoadingState, OperationError, PendingRequest, RequestStats,
};

/// A data fetcher remembering its last successful result.
///
/// Failed or canceled refreshes leave [`data`](Self::data) untouched, so a
/// view keeps showing the previous values while the loading state reports
/// the problem.
pub struct DataProcessing<P, R> {
    coordinator: AsyncRequestCoordinator<P, R>,
    data: Arc<RwLock<Option<R>>>,
}

impl<P, R> DataProcessing<P, R>
where
    P: Send + 'static,
    R: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut, E>(operation: F) -> Self
    where
        F: Fn(P, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        E: Into<OperationError>,
    {
        Self::wrap(AsyncRequestCoordinator::new(operation))
    }

    pub fn from_config<F, Fut, E>(operation: F, config: &RequestConfig) -> Self
    where
        F: Fn(P, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        E: Into<OperationError>,
    {
        Self::wrap(AsyncRequestCoordinator::from_config(operation, config))
    }

    fn wrap(coordinator: AsyncRequestCoordinator<P, R>) -> Self {
        let data = Arc::new(RwLock::new(None));
        let sink = Arc::clone(&data);
        coordinator.set_success_hook(move |value: &R| {
            *sink.write() = Some(value.clone());
        });
        Self { coordinator, data }
    }

    pub fn with_debounce(self, debounce: Duration) -> Self {
        self.coordinator.set_debounce_interval(debounce);
        self
    }

    /// Re-fetches with `params`, superseding any refresh still pending.
    pub fn refresh(&self, params: P) -> PendingRequest<R> {
        self.coordinator.fetch_data(params)
    }

    /// The last successful result, if any.
    pub fn data(&self) -> Option<R> {
        self.data.read().clone()
    }

    /// Forgets the stored result.
    pub fn clear_data(&self) {
        *self.data.write() = None;
    }

    pub fn loading_state(&self) -> LoadingState {
        self.coordinator.loading_state()
    }

    pub fn subscribe_loading_state(&self) -> watch::Receiver<LoadingState> {
        self.coordinator.subscribe_loading_state()
    }

    /// Cancels the pending refresh. Returns true if one was pending.
    pub fn cancel(&self) -> bool {
        self.coordinator.cancel_pending_request()
    }

    pub fn set_debounce_interval(&self, debounce: Duration) {
        self.coordinator.set_debounce_interval(debounce);
    }

    pub fn stats(&self) -> RequestStats {
        self.coordinator.stats()
    }
}

//! Single-slot request coordinator with trailing debounce.
//!
//! # Lifecycle of one `fetch_data` call
//!
//! ```text
//! fetch_data(p)
//!     │  cancel previous slot, allocate new one
//!     ▼
//! [debounce > 0] ── sleep ── canceled? ──► Canceled
//!     │
//!     ▼
//! dispatch: state = Loading, operation(p, token)
//!     │
//!     ├── token canceled ────────────────► Canceled (future dropped)
//!     ▼
//! settle: still current? ── no ──────────► Canceled
//!     │ yes
//!     ▼
//! state = Success | Error, caller gets the result
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use tokio::sync::{oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::error::{OperationError, RequestError};
use super::state::LoadingState;
use crate::config::RequestConfig;

/// Identifier of one `fetch_data` call, unique per coordinator.
pub type RequestId = u64;

type Operation<P, R> =
    Arc<dyn Fn(P, CancellationToken) -> BoxFuture<'static, Result<R, OperationError>> + Send + Sync>;
type CancelHook = Arc<dyn Fn(RequestId) + Send + Sync>;
type SuccessHook<R> = Arc<dyn Fn(&R) + Send + Sync>;

/// Counters describing coordinator activity.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RequestStats {
    /// `fetch_data` calls
    pub calls: u64,
    /// Operations actually started
    pub dispatched: u64,
    /// Operations whose success reached the caller
    pub succeeded: u64,
    /// Operations whose failure reached the caller
    pub failed: u64,
    /// Requests canceled before settling (debounced or in flight)
    pub canceled: u64,
}

impl RequestStats {
    /// Fraction of calls that never started an operation (0.0 to 1.0).
    pub fn debounce_ratio(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            (self.calls - self.dispatched.min(self.calls)) as f64 / self.calls as f64
        }
    }
}

#[derive(Default)]
struct Counters {
    calls: AtomicU64,
    dispatched: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    canceled: AtomicU64,
}

struct Slot {
    id: RequestId,
    token: CancellationToken,
}

struct SlotState {
    next_id: RequestId,
    current: Option<Slot>,
    debounce: Duration,
    /// State to restore when an explicit cancel leaves nothing in flight.
    last_settled: LoadingState,
    /// True from a dispatch until the next settle or explicit cancel, even
    /// when the dispatched request has since been superseded.
    showing_loading: bool,
}

struct Shared<P, R> {
    operation: Operation<P, R>,
    state: Mutex<SlotState>,
    loading: watch::Sender<LoadingState>,
    counters: Counters,
    on_canceled: RwLock<Option<CancelHook>>,
    on_success: RwLock<Option<SuccessHook<R>>>,
}

enum Stage<P, R> {
    Dispatched(BoxFuture<'static, Result<R, OperationError>>),
    Debounced(P, Duration),
}

impl<P, R> Shared<P, R> {
    fn is_current(&self, id: RequestId) -> bool {
        matches!(&self.state.lock().current, Some(slot) if slot.id == id)
    }

    /// Publishes `Loading` and starts the operation, unless the
    /// request was superseded in the meantime.
    fn dispatch(
        &self,
        id: RequestId,
        token: &CancellationToken,
        params: P,
    ) -> Option<BoxFuture<'static, Result<R, OperationError>>> {
        {
            let mut state = self.state.lock();
            match state.current.as_mut() {
                Some(slot) if slot.id == id && !slot.token.is_cancelled() => {}
                _ => return None,
            }
            state.showing_loading = true;
            self.loading.send_replace(LoadingState::Loading);
        }
        self.counters.dispatched.fetch_add(1, Ordering::Relaxed);
        debug!(request = id, "Dispatching request");
        Some((self.operation)(params, token.clone()))
    }

    fn settle(
        &self,
        id: RequestId,
        result: Result<R, OperationError>,
        reply: oneshot::Sender<Result<R, RequestError>>,
    ) {
        let outcome = {
            let mut state = self.state.lock();
            if !matches!(&state.current, Some(slot) if slot.id == id) {
                None
            } else {
                state.current = None;
                let next = match &result {
                    Ok(value) => {
                        // Run under the slot lock so no later request can
                        // observe stale data after its own settlement.
                        if let Some(hook) = self.on_success.read().clone() {
                            hook(value);
                        }
                        LoadingState::Success
                    }
                    Err(err) => LoadingState::Error {
                        message: err.to_string(),
                    },
                };
                state.last_settled = next.clone();
                state.showing_loading = false;
                self.loading.send_replace(next);
                Some(result)
            }
        };

        match outcome {
            None => self.record_cancel(id),
            Some(Ok(value)) => {
                self.counters.succeeded.fetch_add(1, Ordering::Relaxed);
                debug!(request = id, "Request succeeded");
                let _ = reply.send(Ok(value));
            }
            Some(Err(err)) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                let message = err.to_string();
                warn!(request = id, error = %message, "Request failed");
                let _ = reply.send(Err(RequestError::Failed { message }));
            }
        }
    }

    fn record_cancel(&self, id: RequestId) {
        self.counters.canceled.fetch_add(1, Ordering::Relaxed);
        debug!(request = id, "Request canceled, settlement discarded");
        if let Some(hook) = self.on_canceled.read().clone() {
            hook(id);
        }
    }
}

/// Wraps an async operation so at most one invocation is ever outstanding.
///
/// Every [`fetch_data`](Self::fetch_data) supersedes the previous call: its
/// cancellation token fires, its future is dropped and its caller receives
/// [`RequestError::Canceled`]. A superseded settlement never reaches
/// [`loading_state`](Self::loading_state).
///
/// With a non-zero debounce the operation starts only after the interval
/// passes without another call (trailing debounce), so a burst of calls
/// results in exactly one invocation with the last parameters.
///
/// The coordinator needs a tokio runtime; `current_thread` is enough.
/// Dropping it cancels the outstanding request.
pub struct AsyncRequestCoordinator<P, R> {
    shared: Arc<Shared<P, R>>,
}

impl<P, R> AsyncRequestCoordinator<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    /// Creates a coordinator with no debounce.
    pub fn new<F, Fut, E>(operation: F) -> Self
    where
        F: Fn(P, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        E: Into<OperationError>,
    {
        let operation: Operation<P, R> = Arc::new(
            move |params: P, token: CancellationToken| -> BoxFuture<'static, Result<R, OperationError>> {
                operation(params, token)
                    .map(|result| result.map_err(Into::into))
                    .boxed()
            },
        );
        let (loading, _) = watch::channel(LoadingState::Init);

        Self {
            shared: Arc::new(Shared {
                operation,
                state: Mutex::new(SlotState {
                    next_id: 1,
                    current: None,
                    debounce: Duration::ZERO,
                    last_settled: LoadingState::Init,
                    showing_loading: false,
                }),
                loading,
                counters: Counters::default(),
                on_canceled: RwLock::new(None),
                on_success: RwLock::new(None),
            }),
        }
    }

    /// Creates a coordinator using the debounce from `config`.
    pub fn from_config<F, Fut, E>(operation: F, config: &RequestConfig) -> Self
    where
        F: Fn(P, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        E: Into<OperationError>,
    {
        Self::new(operation).with_debounce(config.debounce())
    }

    pub fn with_debounce(self, debounce: Duration) -> Self {
        self.set_debounce_interval(debounce);
        self
    }

    /// Changes the debounce for calls made from now on.
    ///
    /// A request already waiting keeps the interval it was scheduled with.
    pub fn set_debounce_interval(&self, debounce: Duration) {
        self.shared.state.lock().debounce = debounce;
    }

    pub fn debounce_interval(&self) -> Duration {
        self.shared.state.lock().debounce
    }

    /// Registers a hook invoked with the id of every request whose
    /// settlement was discarded.
    pub fn set_cancel_hook(&self, hook: impl Fn(RequestId) + Send + Sync + 'static) {
        *self.shared.on_canceled.write() = Some(Arc::new(hook));
    }

    /// Registers a hook invoked with every successful result before the
    /// caller sees it.
    ///
    /// The hook runs while the coordinator's slot lock is held and must not
    /// call back into the coordinator.
    pub fn set_success_hook(&self, hook: impl Fn(&R) + Send + Sync + 'static) {
        *self.shared.on_success.write() = Some(Arc::new(hook));
    }

    /// Requests a new operation with `params`, superseding any pending one.
    ///
    /// The returned handle resolves with the operation's result, or with
    /// [`RequestError::Canceled`] if a later call or
    /// [`cancel_pending_request`](Self::cancel_pending_request) supersedes it.
    /// The request proceeds whether or not the handle is awaited.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn fetch_data(&self, params: P) -> PendingRequest<R> {
        let shared = &self.shared;
        shared.counters.calls.fetch_add(1, Ordering::Relaxed);

        let (id, token, debounce) = {
            let mut state = shared.state.lock();
            if let Some(previous) = state.current.take() {
                previous.token.cancel();
                debug!(request = previous.id, "Superseding pending request");
            }
            let id = state.next_id;
            state.next_id += 1;
            let token = CancellationToken::new();
            state.current = Some(Slot {
                id,
                token: token.clone(),
            });
            (id, token, state.debounce)
        };

        let (reply, receiver) = oneshot::channel();
        let pending = PendingRequest {
            id,
            token: token.clone(),
            receiver,
        };

        let stage = if debounce.is_zero() {
            match shared.dispatch(id, &token, params) {
                Some(future) => Stage::Dispatched(future),
                None => {
                    shared.record_cancel(id);
                    return pending;
                }
            }
        } else {
            debug!(request = id, ?debounce, "Request debounced");
            Stage::Debounced(params, debounce)
        };

        tokio::spawn(run_request(Arc::clone(shared), id, token, stage, reply));
        pending
    }

    /// Cancels the pending request, if any. Returns true if one was pending.
    ///
    /// Nothing is in flight afterwards, so a `Loading` state left by this
    /// request or by one it superseded reverts to the last settled state.
    pub fn cancel_pending_request(&self) -> bool {
        let mut state = self.shared.state.lock();
        let Some(slot) = state.current.take() else {
            return false;
        };
        slot.token.cancel();
        let restore = std::mem::take(&mut state.showing_loading);
        if restore {
            let restored = state.last_settled.clone();
            self.shared.loading.send_replace(restored);
        }
        debug!(request = slot.id, restored = restore, "Pending request canceled");
        true
    }

    /// Returns true while a request is debouncing or in flight.
    pub fn has_pending_request(&self) -> bool {
        self.shared.state.lock().current.is_some()
    }

    pub fn loading_state(&self) -> LoadingState {
        self.shared.loading.borrow().clone()
    }

    /// Receiver notified on every loading state change.
    pub fn subscribe_loading_state(&self) -> watch::Receiver<LoadingState> {
        self.shared.loading.subscribe()
    }

    pub fn stats(&self) -> RequestStats {
        let counters = &self.shared.counters;
        RequestStats {
            calls: counters.calls.load(Ordering::Relaxed),
            dispatched: counters.dispatched.load(Ordering::Relaxed),
            succeeded: counters.succeeded.load(Ordering::Relaxed),
            failed: counters.failed.load(Ordering::Relaxed),
            canceled: counters.canceled.load(Ordering::Relaxed),
        }
    }
}

impl<P, R> Drop for AsyncRequestCoordinator<P, R> {
    fn drop(&mut self) {
        if let Some(slot) = self.shared.state.lock().current.take() {
            slot.token.cancel();
        }
    }
}

async fn run_request<P, R>(
    shared: Arc<Shared<P, R>>,
    id: RequestId,
    token: CancellationToken,
    stage: Stage<P, R>,
    reply: oneshot::Sender<Result<R, RequestError>>,
) {
    let future = match stage {
        Stage::Dispatched(future) => future,
        Stage::Debounced(params, delay) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    shared.record_cancel(id);
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }
            match shared.dispatch(id, &token, params) {
                Some(future) => future,
                None => {
                    shared.record_cancel(id);
                    return;
                }
            }
        }
    };

    let result = tokio::select! {
        biased;
        _ = token.cancelled() => {
            shared.record_cancel(id);
            return;
        }
        result = future => result,
    };

    if !shared.is_current(id) {
        shared.record_cancel(id);
        return;
    }
    shared.settle(id, result, reply);
}

/// Handle to one `fetch_data` call.
///
/// Resolves to the operation's result, or [`RequestError::Canceled`] once
/// the request is superseded. Dropping the handle does not cancel the
/// request.
#[must_use = "the result of a request is only observable by awaiting it"]
pub struct PendingRequest<R> {
    id: RequestId,
    token: CancellationToken,
    receiver: oneshot::Receiver<Result<R, RequestError>>,
}

impl<R> PendingRequest<R> {
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Returns true once the request has been superseded or canceled.
    pub fn is_canceled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl<R> Future for PendingRequest<R> {
    type Output = Result<R, RequestError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(RequestError::Canceled)))
    }
}

impl<R> std::fmt::Debug for PendingRequest<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequest")
            .field("id", &self.id)
            .field("canceled", &self.is_canceled())
            .finish()
    }
}

//! Teardown handles for registered listeners.
//!
//! A [`Subscription`] wraps a single teardown closure. The closure is an
//! `FnOnce`, so the type system guarantees it can run at most once; the
//! handle runs it on [`Subscription::unsubscribe`] or on drop, whichever
//! comes first.
//!
//! A [`SubscriptionTracker`] aggregates many subscriptions for an owner
//! (typically a layer controller) and disposes of all of them in one call.

use std::fmt;

/// RAII guard for a registered listener.
///
/// Dropping the guard removes the listener. Call [`forget`](Self::forget)
/// to keep the listener registered for the lifetime of its source.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Creates a subscription that runs `teardown` exactly once.
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// Creates a subscription with nothing to tear down.
    pub fn empty() -> Self {
        Self { teardown: None }
    }

    /// Runs the teardown now.
    pub fn unsubscribe(mut self) {
        self.run();
    }

    /// Returns true if the teardown has not run yet.
    pub fn is_active(&self) -> bool {
        self.teardown.is_some()
    }

    /// Drops the handle without running the teardown.
    pub fn forget(mut self) {
        self.teardown = None;
    }

    fn run(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Aggregator of subscriptions with exactly-once bulk disposal.
///
/// Subscriptions are torn down in registration order. `unsubscribe` is
/// idempotent; subscriptions added after a bulk teardown are tracked
/// again and disposed by the next call (or on drop).
#[derive(Default)]
pub struct SubscriptionTracker {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks an existing subscription.
    pub fn add(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    /// Tracks a bare teardown closure.
    pub fn add_fn(&mut self, teardown: impl FnOnce() + 'static) {
        self.subscriptions.push(Subscription::new(teardown));
    }

    /// Number of subscriptions awaiting teardown.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns true if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Tears down every tracked subscription.
    pub fn unsubscribe(&mut self) {
        // Take the list first so teardowns that re-enter the owner see an
        // empty tracker.
        let subscriptions = std::mem::take(&mut self.subscriptions);
        for subscription in subscriptions {
            subscription.unsubscribe();
        }
    }
}

impl Extend<Subscription> for SubscriptionTracker {
    fn extend<I: IntoIterator<Item = Subscription>>(&mut self, iter: I) {
        self.subscriptions.extend(iter);
    }
}

impl Drop for SubscriptionTracker {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for SubscriptionTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionTracker")
            .field("len", &self.len())
            .finish()
    }
}

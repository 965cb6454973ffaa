//! Single-threaded reactive primitives.
//!
//! - [`Observable`]: a shared value with change notification, used for the
//!   per-field state of layer models.
//! - [`ObservableSequence`]: an ordered list emitting splice/update batches,
//!   consumed by the keyed reconciler.
//! - [`Subscription`] / [`SubscriptionTracker`]: exactly-once teardown of
//!   registered listeners.
//!
//! # Invariants
//!
//! 1. A subscription's teardown runs exactly once: on explicit unsubscribe,
//!    on bulk teardown through its tracker, or on drop.
//! 2. Listeners are notified in registration order.
//! 3. Setting an observable to an equal value is a no-op.
//! 4. Sequence change batches are delivered strictly FIFO, including those
//!    caused by mutations made from inside a listener.
//!
//! Everything here is `!Send`; state is shared through `Rc<RefCell<..>>`.

mod observable;
mod sequence;
mod subscription;

pub use observable::Observable;
pub use sequence::{ObservableSequence, SequenceChange};
pub use subscription::{Subscription, SubscriptionTracker};

//! Keyed reconciliation of live collections against external resources.
//!
//! A [`KeyedReconciler`] watches an [`ObservableSequence`] and keeps one
//! externally created state per item key, calling back into its owner
//! whenever an item enters or leaves the sequence.
//!
//! # Ordering
//!
//! ```text
//! splice(index=2, removed=[c, d], added=[x])
//!
//!   on_item_remove(c) ─► on_item_remove(d) ─► on_item_add(x, 2)
//! ```
//!
//! Within one batch all removals run first (in original order), then all
//! additions (in final-index order). An update batch is a remove/add pair at
//! the same index. Across batches, dispatch is FIFO.
//!
//! # Invariants
//!
//! - After any batch the tracked key set equals the key set of the sequence.
//! - Adding a key that is already tracked removes the stale state first.
//! - `destroy()` (or drop) removes every tracked state exactly once.
//!
//! [`ObservableSequence`]: crate::reactive::ObservableSequence

mod reconciler;

pub use reconciler::KeyedReconciler;

use std::rc::Rc;

/// Stable identity of a tracked item.
pub type Key = String;

/// Items that carry their own key.
pub trait Keyed {
    fn key(&self) -> Key;
}

impl<T: Keyed + ?Sized> Keyed for Rc<T> {
    fn key(&self) -> Key {
        (**self).key()
    }
}

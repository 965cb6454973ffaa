//! Keyed reconciler implementation.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use super::{Key, Keyed};
use crate::reactive::{ObservableSequence, SequenceChange, Subscription};

type IdGetter<T> = Box<dyn Fn(&T) -> Key>;
type AddFn<T, S> = Box<dyn Fn(&T, usize) -> S>;
type RemoveFn<S> = Box<dyn Fn(S)>;

struct Core<T, S> {
    tracked: RefCell<HashMap<Key, S>>,
    id_getter: IdGetter<T>,
    on_item_add: AddFn<T, S>,
    on_item_remove: RemoveFn<S>,
}

impl<T, S> Core<T, S> {
    fn add(&self, item: &T, index: usize) {
        let key = (self.id_getter)(item);

        // Never overwrite live state: release the stale entry first.
        let stale = self.tracked.borrow_mut().remove(&key);
        if let Some(stale) = stale {
            warn!(
                key = %key,
                index,
                "Duplicate key in sequence, releasing state of the earlier occurrence"
            );
            (self.on_item_remove)(stale);
        }

        let state = (self.on_item_add)(item, index);
        self.tracked.borrow_mut().insert(key, state);
    }

    fn remove(&self, item: &T) {
        let key = (self.id_getter)(item);
        let state = self.tracked.borrow_mut().remove(&key);
        match state {
            Some(state) => (self.on_item_remove)(state),
            None => trace!(key = %key, "Removed item was not tracked"),
        }
    }

    fn apply(&self, change: &SequenceChange<T>) {
        match change {
            SequenceChange::Splice {
                index,
                removed,
                added,
            } => {
                // Removals first so a moved item (same key removed and re-added
                // in one batch) never collides with itself.
                for item in removed {
                    self.remove(item);
                }
                for (offset, item) in added.iter().enumerate() {
                    self.add(item, index + offset);
                }
            }
            SequenceChange::Update { index, old, new } => {
                self.remove(old);
                self.add(new, *index);
            }
        }
    }

    fn drain(&self) {
        let states: Vec<S> = self.tracked.borrow_mut().drain().map(|(_, s)| s).collect();
        for state in states {
            (self.on_item_remove)(state);
        }
    }
}

/// Mirrors an [`ObservableSequence`] into a map of externally created states.
///
/// For every item entering the sequence `on_item_add(item, index)` produces
/// a state; for every item leaving it the matching state is handed to
/// `on_item_remove`. Construction replays the current contents as an
/// initial add pass.
///
/// The reconciler is destroyed when dropped: it stops listening to the
/// sequence and releases every tracked state, so nothing downstream leaks
/// even if the sequence itself lives on.
///
/// # Duplicate keys
///
/// Keys must be unique within the sequence. A second occurrence of a key
/// releases the first occurrence's state and takes its place, and removing
/// either occurrence later releases that single state. After a duplicate
/// the tracked keys no longer match the sequence.
///
/// # Panics
///
/// Callbacks run inside the sequence's dispatch. They must not mutate the
/// tracked sequence or call back into the reconciler; a panic in a callback
/// propagates to whoever mutated the sequence.
pub struct KeyedReconciler<T: 'static, S: 'static> {
    core: Rc<Core<T, S>>,
    subscription: Option<Subscription>,
}

impl<T: Keyed + Clone + 'static, S: 'static> KeyedReconciler<T, S> {
    /// Creates a reconciler keyed by each item's own [`Keyed::key`].
    pub fn new(
        items: &ObservableSequence<T>,
        on_item_add: impl Fn(&T, usize) -> S + 'static,
        on_item_remove: impl Fn(S) + 'static,
    ) -> Self {
        Self::with_id_getter(items, |item: &T| item.key(), on_item_add, on_item_remove)
    }
}

impl<T: Clone + 'static, S: 'static> KeyedReconciler<T, S> {
    /// Creates a reconciler with a custom key extractor.
    pub fn with_id_getter(
        items: &ObservableSequence<T>,
        id_getter: impl Fn(&T) -> Key + 'static,
        on_item_add: impl Fn(&T, usize) -> S + 'static,
        on_item_remove: impl Fn(S) + 'static,
    ) -> Self {
        let core = Rc::new(Core {
            tracked: RefCell::new(HashMap::new()),
            id_getter: Box::new(id_getter),
            on_item_add: Box::new(on_item_add),
            on_item_remove: Box::new(on_item_remove),
        });

        let initial = items.snapshot();
        for (index, item) in initial.iter().enumerate() {
            core.add(item, index);
        }

        let weak: Weak<Core<T, S>> = Rc::downgrade(&core);
        let subscription = items.subscribe(move |change| {
            if let Some(core) = weak.upgrade() {
                core.apply(change);
            }
        });

        debug!(tracked = initial.len(), "Keyed reconciler attached");

        Self {
            core,
            subscription: Some(subscription),
        }
    }
}

impl<T: 'static, S: 'static> KeyedReconciler<T, S> {
    /// Visits every tracked state, in no particular order.
    pub fn for_each_item(&self, mut f: impl FnMut(&S)) {
        for state in self.core.tracked.borrow().values() {
            f(state);
        }
    }

    /// Runs `f` on the state tracked under `key`.
    pub fn with_item<R>(&self, key: &str, f: impl FnOnce(&S) -> R) -> Option<R> {
        self.core.tracked.borrow().get(key).map(f)
    }

    /// Number of tracked states.
    pub fn len(&self) -> usize {
        self.core.tracked.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.tracked.borrow().is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.core.tracked.borrow().contains_key(key)
    }

    /// Currently tracked keys, in no particular order.
    pub fn keys(&self) -> Vec<Key> {
        self.core.tracked.borrow().keys().cloned().collect()
    }

    /// Returns true once [`destroy`](Self::destroy) has run.
    pub fn is_destroyed(&self) -> bool {
        self.subscription.is_none()
    }

    /// Stops listening to the sequence and removes every tracked state.
    ///
    /// Idempotent.
    pub fn destroy(&mut self) {
        let Some(subscription) = self.subscription.take() else {
            return;
        };
        subscription.unsubscribe();

        let tracked = self.len();
        self.core.drain();
        debug!(released = tracked, "Keyed reconciler destroyed");
    }
}

impl<T: 'static, S: 'static> Drop for KeyedReconciler<T, S> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<T: 'static, S: 'static> fmt::Debug for KeyedReconciler<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedReconciler")
            .field("tracked", &self.len())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

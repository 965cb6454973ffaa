//! Ordered, observable collection emitting typed change batches.
//!
//! Every mutation is reported as exactly one [`SequenceChange`]:
//!
//! - [`SequenceChange::Splice`]: the range `[index, index + removed.len())`
//!   of the previous contents was replaced by `added`.
//! - [`SequenceChange::Update`]: the single slot at `index` was replaced.
//!
//! # Dispatch
//!
//! Listeners run synchronously inside the mutating call. A mutation issued
//! from inside a listener is applied to the contents immediately, but its
//! notification is queued and delivered after the current one has reached
//! every listener. Batches are therefore always observed in the order the
//! mutations happened.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use super::subscription::Subscription;

/// A change batch emitted by an [`ObservableSequence`].
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceChange<T> {
    /// `removed` was replaced by `added` starting at `index`.
    Splice {
        index: usize,
        removed: Vec<T>,
        added: Vec<T>,
    },
    /// The item at `index` was replaced.
    Update { index: usize, old: T, new: T },
}

impl<T> SequenceChange<T> {
    /// Index the change starts at.
    pub fn index(&self) -> usize {
        match self {
            Self::Splice { index, .. } | Self::Update { index, .. } => *index,
        }
    }
}

type Listener<T> = Rc<dyn Fn(&SequenceChange<T>)>;

struct Inner<T> {
    items: Vec<T>,
    next_listener_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
    pending: VecDeque<SequenceChange<T>>,
    dispatching: bool,
}

/// Resets the dispatch flag even if a listener panics.
struct DispatchGuard<'a, T> {
    inner: &'a RefCell<Inner<T>>,
}

impl<T> Drop for DispatchGuard<'_, T> {
    fn drop(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.dispatching = false;
        if std::thread::panicking() {
            inner.pending.clear();
        }
    }
}

/// Shared ordered list with change notification. Clones share state.
pub struct ObservableSequence<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for ObservableSequence<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> ObservableSequence<T> {
    /// Creates an empty sequence.
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Creates a sequence holding `items`.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                items,
                next_listener_id: 0,
                listeners: Vec::new(),
                pending: VecDeque::new(),
                dispatching: false,
            })),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().items.is_empty()
    }

    /// Returns a clone of the item at `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        self.inner.borrow().items.get(index).cloned()
    }

    /// Returns a copy of the current contents.
    pub fn snapshot(&self) -> Vec<T> {
        self.inner.borrow().items.clone()
    }

    /// Borrows the current contents.
    pub fn with_items<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.inner.borrow().items)
    }

    /// Returns the index of the first item matching `predicate`.
    pub fn position(&self, predicate: impl Fn(&T) -> bool) -> Option<usize> {
        self.inner.borrow().items.iter().position(predicate)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Appends `item`.
    pub fn push(&self, item: T) {
        let index = self.len();
        self.splice(index, 0, vec![item]);
    }

    /// Inserts `item` at `index` (clamped to the current length).
    pub fn insert(&self, index: usize, item: T) {
        self.splice(index, 0, vec![item]);
    }

    /// Removes and returns the item at `index`, if any.
    pub fn remove(&self, index: usize) -> Option<T> {
        if index >= self.len() {
            return None;
        }
        self.splice(index, 1, Vec::new()).into_iter().next()
    }

    /// Replaces the item at `index`, returning the previous one.
    ///
    /// Emits [`SequenceChange::Update`]. Returns `None` and emits nothing if
    /// `index` is out of bounds.
    pub fn set(&self, index: usize, item: T) -> Option<T> {
        let old = {
            let mut inner = self.inner.borrow_mut();
            let slot = inner.items.get_mut(index)?;
            std::mem::replace(slot, item.clone())
        };
        self.emit(SequenceChange::Update {
            index,
            old: old.clone(),
            new: item,
        });
        Some(old)
    }

    /// Replaces `remove_count` items starting at `index` with `added`.
    ///
    /// `index` is clamped to the current length and `remove_count` to the
    /// number of items after it. Returns the removed items. A splice that
    /// neither removes nor adds anything emits no notification.
    pub fn splice(&self, index: usize, remove_count: usize, added: Vec<T>) -> Vec<T> {
        let (index, removed) = {
            let mut inner = self.inner.borrow_mut();
            let len = inner.items.len();
            let index = index.min(len);
            let end = index + remove_count.min(len - index);
            let removed: Vec<T> = inner.items.splice(index..end, added.iter().cloned()).collect();
            (index, removed)
        };

        if removed.is_empty() && added.is_empty() {
            return removed;
        }

        self.emit(SequenceChange::Splice {
            index,
            removed: removed.clone(),
            added,
        });
        removed
    }

    /// Moves the item at `from` to `to` as a removal batch followed by an
    /// insertion batch.
    pub fn move_item(&self, from: usize, to: usize) -> bool {
        match self.remove(from) {
            Some(item) => {
                self.insert(to, item);
                true
            }
            None => false,
        }
    }

    /// Replaces the whole contents in one splice.
    pub fn replace_all(&self, items: Vec<T>) -> Vec<T> {
        let len = self.len();
        self.splice(0, len, items)
    }

    /// Removes every item.
    pub fn clear(&self) -> Vec<T> {
        self.replace_all(Vec::new())
    }

    /// Registers `listener`; it is removed when the returned guard is dropped.
    pub fn subscribe(&self, listener: impl Fn(&SequenceChange<T>) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_listener_id;
            inner.next_listener_id += 1;
            inner.listeners.push((id, Rc::new(listener)));
            id
        };

        let weak: Weak<RefCell<Inner<T>>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().listeners.retain(|(lid, _)| *lid != id);
            }
        })
    }

    fn emit(&self, change: SequenceChange<T>) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.pending.push_back(change);
            if inner.dispatching {
                return;
            }
            inner.dispatching = true;
        }

        let _guard = DispatchGuard { inner: &self.inner };
        loop {
            let (change, listeners) = {
                let mut inner = self.inner.borrow_mut();
                let Some(change) = inner.pending.pop_front() else {
                    break;
                };
                let listeners: Vec<Listener<T>> = inner
                    .listeners
                    .iter()
                    .map(|(_, listener)| Rc::clone(listener))
                    .collect();
                (change, listeners)
            };

            for listener in listeners {
                listener(&change);
            }
        }
    }
}

impl<T: Clone + 'static> Default for ObservableSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> FromIterator<T> for ObservableSequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableSequence")
            .field("items", &self.inner.borrow().items)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(seq: &ObservableSequence<i32>) -> (Rc<RefCell<Vec<SequenceChange<i32>>>>, Subscription) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = Rc::clone(&log);
        let sub = seq.subscribe(move |change| log_clone.borrow_mut().push(change.clone()));
        (log, sub)
    }

    #[test]
    fn test_push_emits_splice_at_end() {
        let seq = ObservableSequence::from_vec(vec![1, 2]);
        let (log, _sub) = recorder(&seq);

        seq.push(3);

        assert_eq!(seq.snapshot(), vec![1, 2, 3]);
        assert_eq!(
            log.borrow()[0],
            SequenceChange::Splice {
                index: 2,
                removed: vec![],
                added: vec![3]
            }
        );
    }

    #[test]
    fn test_splice_reports_removed_and_added() {
        let seq = ObservableSequence::from_vec(vec![1, 2, 3, 4, 5]);
        let (log, _sub) = recorder(&seq);

        let removed = seq.splice(2, 2, vec![9]);

        assert_eq!(removed, vec![3, 4]);
        assert_eq!(seq.snapshot(), vec![1, 2, 9, 5]);
        assert_eq!(
            log.borrow()[0],
            SequenceChange::Splice {
                index: 2,
                removed: vec![3, 4],
                added: vec![9]
            }
        );
    }

    #[test]
    fn test_splice_clamps_out_of_range() {
        let seq = ObservableSequence::from_vec(vec![1, 2]);
        let removed = seq.splice(10, 5, vec![3]);
        assert!(removed.is_empty());
        assert_eq!(seq.snapshot(), vec![1, 2, 3]);

        let removed = seq.splice(1, 99, vec![]);
        assert_eq!(removed, vec![2, 3]);
        assert_eq!(seq.snapshot(), vec![1]);
    }

    #[test]
    fn test_empty_splice_emits_nothing() {
        let seq = ObservableSequence::from_vec(vec![1]);
        let (log, _sub) = recorder(&seq);
        seq.splice(0, 0, vec![]);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_set_emits_update() {
        let seq = ObservableSequence::from_vec(vec![1, 2]);
        let (log, _sub) = recorder(&seq);

        assert_eq!(seq.set(1, 7), Some(2));
        assert_eq!(seq.set(5, 7), None);

        assert_eq!(log.borrow().len(), 1);
        assert_eq!(
            log.borrow()[0],
            SequenceChange::Update {
                index: 1,
                old: 2,
                new: 7
            }
        );
    }

    #[test]
    fn test_remove_out_of_bounds() {
        let seq = ObservableSequence::from_vec(vec![1]);
        assert_eq!(seq.remove(3), None);
        assert_eq!(seq.remove(0), Some(1));
        assert!(seq.is_empty());
    }

    #[test]
    fn test_move_item_is_remove_then_insert() {
        let seq = ObservableSequence::from_vec(vec![1, 2, 3]);
        let (log, _sub) = recorder(&seq);

        assert!(seq.move_item(0, 2));
        assert_eq!(seq.snapshot(), vec![2, 3, 1]);
        assert_eq!(log.borrow().len(), 2);
        assert_eq!(log.borrow()[0].index(), 0);
        assert_eq!(log.borrow()[1].index(), 2);
    }

    #[test]
    fn test_reentrant_mutation_is_queued_fifo() {
        let seq = ObservableSequence::from_vec(vec![1]);
        let order = Rc::new(RefCell::new(Vec::new()));

        let seq_clone = seq.clone();
        let order_a = Rc::clone(&order);
        let _first = seq.subscribe(move |change| {
            order_a.borrow_mut().push(("a", change.index()));
            if change.index() == 1 {
                seq_clone.push(100);
            }
        });
        let order_b = Rc::clone(&order);
        let _second = seq.subscribe(move |change| order_b.borrow_mut().push(("b", change.index())));

        seq.push(2);

        assert_eq!(seq.snapshot(), vec![1, 2, 100]);
        assert_eq!(
            *order.borrow(),
            vec![("a", 1), ("b", 1), ("a", 2), ("b", 2)]
        );
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let seq = ObservableSequence::from_vec(vec![1]);
        let (log, sub) = recorder(&seq);
        sub.unsubscribe();
        seq.push(2);
        assert!(log.borrow().is_empty());
        assert_eq!(seq.listener_count(), 0);
    }

    #[test]
    fn test_clear_emits_single_batch() {
        let seq: ObservableSequence<i32> = (0..4).collect();
        let (log, _sub) = recorder(&seq);
        assert_eq!(seq.clear(), vec![0, 1, 2, 3]);
        assert_eq!(log.borrow().len(), 1);
    }
}

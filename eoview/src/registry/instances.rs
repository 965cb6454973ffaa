//! Id → weak instance lookup.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// Registry of live instances by id, holding only weak references.
///
/// Lookups never keep an instance alive: once the last strong reference is
/// gone, [`get`](Self::get) returns `None` and the stale entry is dropped on
/// the next [`prune`](Self::prune) or re-registration.
pub struct InstanceRegistry<T> {
    entries: RefCell<HashMap<String, Weak<T>>>,
}

impl<T> InstanceRegistry<T> {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Records `instance` under `id`, replacing any previous entry.
    pub fn register(&self, id: impl Into<String>, instance: &Rc<T>) {
        self.entries
            .borrow_mut()
            .insert(id.into(), Rc::downgrade(instance));
    }

    /// Removes the entry for `id`. Returns true if one existed.
    pub fn unregister(&self, id: &str) -> bool {
        self.entries.borrow_mut().remove(id).is_some()
    }

    /// Returns the instance if it is still alive.
    pub fn get(&self, id: &str) -> Option<Rc<T>> {
        self.entries.borrow().get(id).and_then(Weak::upgrade)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Drops entries whose instance is gone. Returns how many were removed.
    pub fn prune(&self) -> usize {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|_, weak| weak.strong_count() > 0);
        before - entries.len()
    }

    /// Number of entries, including dead ones not yet pruned.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Ids of live instances, sorted.
    pub fn live_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .entries
            .borrow()
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }
}

impl<T> Default for InstanceRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for InstanceRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceRegistry")
            .field("live", &self.live_ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_live_instance() {
        let registry = InstanceRegistry::new();
        let value = Rc::new(42);
        registry.register("answer", &value);

        assert_eq!(registry.get("answer").as_deref(), Some(&42));
        assert!(registry.contains("answer"));
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_dead_instance_returns_none() {
        let registry = InstanceRegistry::new();
        let value = Rc::new("layer");
        registry.register("l1", &value);
        drop(value);

        assert!(registry.get("l1").is_none());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.prune(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_does_not_keep_alive() {
        let registry = InstanceRegistry::new();
        let value = Rc::new(1);
        registry.register("x", &value);
        assert_eq!(Rc::strong_count(&value), 1);
    }

    #[test]
    fn test_unregister_and_live_ids() {
        let registry = InstanceRegistry::new();
        let a = Rc::new(1);
        let b = Rc::new(2);
        registry.register("b", &b);
        registry.register("a", &a);
        assert_eq!(registry.live_ids(), vec!["a", "b"]);

        assert!(registry.unregister("a"));
        assert!(!registry.unregister("a"));
        assert_eq!(registry.live_ids(), vec!["b"]);
    }
}

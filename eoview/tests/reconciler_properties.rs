//! Property tests for keyed reconciliation.
//!
//! Random mutation scripts are applied to an observable sequence and the
//! reconciler's tracked state is checked against the sequence after every
//! step.

use std::cell::RefCell;
use std::rc::Rc;

use eoview::reactive::ObservableSequence;
use eoview::reconcile::{Key, Keyed, KeyedReconciler};
use proptest::prelude::*;

// =============================================================================
// Test Helpers
// =============================================================================

#[derive(Debug, Clone)]
struct Item {
    id: String,
}

impl Keyed for Item {
    fn key(&self) -> Key {
        self.id.clone()
    }
}

#[derive(Debug, Clone)]
enum Op {
    Push,
    Insert(usize),
    Remove(usize),
    Set(usize),
    Splice(usize, usize, usize),
    Move(usize, usize),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Push),
        (0..10usize).prop_map(Op::Insert),
        (0..10usize).prop_map(Op::Remove),
        (0..10usize).prop_map(Op::Set),
        (0..10usize, 0..4usize, 0..4usize).prop_map(|(i, r, a)| Op::Splice(i, r, a)),
        (0..10usize, 0..10usize).prop_map(|(f, t)| Op::Move(f, t)),
        Just(Op::Clear),
    ]
}

/// Hands out keys that never repeat within one script.
struct Keys(usize);

impl Keys {
    fn next(&mut self) -> Item {
        self.0 += 1;
        Item {
            id: format!("item-{}", self.0),
        }
    }
}

fn apply(items: &ObservableSequence<Item>, op: &Op, keys: &mut Keys) {
    match *op {
        Op::Push => items.push(keys.next()),
        Op::Insert(index) => items.insert(index, keys.next()),
        Op::Remove(index) => {
            items.remove(index);
        }
        Op::Set(index) => {
            items.set(index, keys.next());
        }
        Op::Splice(index, remove, add) => {
            let added = (0..add).map(|_| keys.next()).collect();
            items.splice(index, remove, added);
        }
        Op::Move(from, to) => {
            items.move_item(from, to);
        }
        Op::Clear => {
            items.clear();
        }
    }
}

fn sorted_keys(items: &ObservableSequence<Item>) -> Vec<Key> {
    let mut keys: Vec<Key> = items.snapshot().iter().map(Keyed::key).collect();
    keys.sort();
    keys
}

type Log = Rc<RefCell<Vec<String>>>;

fn logging_reconciler(items: &ObservableSequence<Item>, log: &Log) -> KeyedReconciler<Item, String> {
    let on_add = Rc::clone(log);
    let on_remove = Rc::clone(log);
    KeyedReconciler::new(
        items,
        move |item: &Item, index| {
            on_add.borrow_mut().push(format!("add {}@{}", item.id, index));
            item.id.clone()
        },
        move |state: String| on_remove.borrow_mut().push(format!("remove {}", state)),
    )
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// Property: tracked keys always equal the keys of the sequence.
    #[test]
    fn prop_tracked_keys_match_sequence(
        initial in 0..6usize,
        ops in prop::collection::vec(op_strategy(), 0..40),
    ) {
        let mut keys = Keys(0);
        let items: ObservableSequence<Item> = (0..initial).map(|_| keys.next()).collect();
        let log = Log::default();
        let reconciler = logging_reconciler(&items, &log);

        for op in &ops {
            apply(&items, op, &mut keys);
            let mut tracked = reconciler.keys();
            tracked.sort();
            prop_assert_eq!(tracked, sorted_keys(&items));
        }
    }

    /// Property: destroy removes every tracked state exactly once, and the
    /// reconciler stays silent afterwards.
    #[test]
    fn prop_destroy_releases_each_key_once(
        initial in 0..6usize,
        ops in prop::collection::vec(op_strategy(), 0..20),
        after in prop::collection::vec(op_strategy(), 0..10),
    ) {
        let mut keys = Keys(0);
        let items: ObservableSequence<Item> = (0..initial).map(|_| keys.next()).collect();
        let log = Log::default();
        let mut reconciler = logging_reconciler(&items, &log);

        for op in &ops {
            apply(&items, op, &mut keys);
        }
        let live = sorted_keys(&items);
        log.borrow_mut().clear();

        reconciler.destroy();
        reconciler.destroy();

        let mut removed: Vec<String> = log
            .borrow()
            .iter()
            .map(|entry| entry.trim_start_matches("remove ").to_string())
            .collect();
        removed.sort();
        prop_assert_eq!(removed, live);
        prop_assert!(reconciler.is_empty());

        log.borrow_mut().clear();
        for op in &after {
            apply(&items, op, &mut keys);
        }
        prop_assert!(log.borrow().is_empty());
        prop_assert_eq!(items.listener_count(), 0);
    }
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn test_splice_removals_precede_additions() {
    let items: ObservableSequence<Item> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|id| Item { id: id.to_string() })
        .collect();
    let log = Log::default();
    let _reconciler = logging_reconciler(&items, &log);
    log.borrow_mut().clear();

    items.splice(2, 2, vec![Item { id: "x".to_string() }]);

    assert_eq!(
        *log.borrow(),
        vec!["remove c", "remove d", "add x@2"]
    );
}

#[test]
fn test_initial_pass_adds_in_order() {
    let items: ObservableSequence<Item> = ["a", "b"]
        .iter()
        .map(|id| Item { id: id.to_string() })
        .collect();
    let log = Log::default();
    let reconciler = logging_reconciler(&items, &log);

    assert_eq!(*log.borrow(), vec!["add a@0", "add b@1"]);
    assert_eq!(reconciler.len(), 2);
}

#[test]
fn test_dropping_reconciler_releases_states() {
    let items: ObservableSequence<Item> = ["a", "b"]
        .iter()
        .map(|id| Item { id: id.to_string() })
        .collect();
    let log = Log::default();
    drop(logging_reconciler(&items, &log));

    let removals = log.borrow().iter().filter(|e| e.starts_with("remove")).count();
    assert_eq!(removals, 2);
    assert_eq!(items.listener_count(), 0);
}

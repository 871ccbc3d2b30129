//! Reactivity tests

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use serde_json::json;
use vbind::*;

fn path(s: &str) -> PropertyPath {
    PropertyPath::parse(s).unwrap()
}

/// Watch `expr` and record every value the callback sees.
fn recorder(store: &Store, expr: &str) -> (Rc<Watcher>, Rc<RefCell<Vec<Value>>>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    let watcher = Watcher::new(store, path(expr), move |value| {
        log.borrow_mut().push(value.clone());
        Ok(())
    });
    (watcher, seen)
}

// ═══════════════════════════════════════════════════════════════════════
// Read / Write
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_write_then_read() {
    let store = Store::from_json(json!({"a": {"b": 1}, "c": "x"})).unwrap();
    store.set("a.b", 2).unwrap();
    store.set("c", "y").unwrap();
    assert_eq!(store.get("a.b").unwrap(), Value::Int(2));
    assert_eq!(store.get("c").unwrap(), Value::from("y"));
}

#[test]
fn test_snapshot_reflects_writes() {
    let store = Store::from_json(json!({"a": 1, "list": [1, 2]})).unwrap();
    store.set("a", 5).unwrap();
    store
        .set("list", Value::list(vec![Value::Int(3)]))
        .unwrap();
    assert_eq!(store.snapshot().unwrap(), json!({"a": 5, "list": [3]}));
}

// ═══════════════════════════════════════════════════════════════════════
// Subscriptions
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_watcher_subscribes_along_the_path() {
    let store = Store::from_json(json!({"a": {"b": 1}})).unwrap();
    let (watcher, _) = recorder(&store, "a.b");

    let a_dep = store.root().dep("a").unwrap();
    let inner = store.get("a").unwrap().as_object().unwrap().clone();
    let b_dep = inner.dep("b").unwrap();
    assert_eq!(a_dep.subscribers(), vec![watcher.id()]);
    assert_eq!(b_dep.subscribers(), vec![watcher.id()]);
}

#[test]
fn test_watcher_appears_once_after_many_updates() {
    let store = Store::from_json(json!({"a": 0})).unwrap();
    let (watcher, seen) = recorder(&store, "a");
    for n in 1..=5 {
        store.set("a", n).unwrap();
    }

    let dep = store.root().dep("a").unwrap();
    assert_eq!(dep.len(), 1);
    assert!(dep.contains(watcher.id()));
    assert_eq!(seen.borrow().len(), 5);
}

#[test]
fn test_equal_write_does_not_notify() {
    let store = Store::from_json(json!({"a": "same"})).unwrap();
    let (_watcher, seen) = recorder(&store, "a");
    store.set("a", "same").unwrap();
    store.set("a", "same").unwrap();
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_nan_write_is_not_a_change() {
    let store = Store::from_json(json!({"x": 1.5})).unwrap();
    let (_watcher, seen) = recorder(&store, "x");

    store.set("x", f64::NAN).unwrap();
    store.set("x", f64::NAN).unwrap();
    assert_eq!(seen.borrow().len(), 1);
    assert!(seen.borrow()[0].as_f64().unwrap().is_nan());
}

#[test]
fn test_callback_receives_new_value() {
    let store = Store::from_json(json!({"a": 1})).unwrap();
    let (watcher, seen) = recorder(&store, "a");
    assert_eq!(watcher.value(), Value::Int(1));

    store.set("a", 2).unwrap();
    assert_eq!(*seen.borrow(), vec![Value::Int(2)]);
    assert_eq!(watcher.value(), Value::Int(2));
}

#[test]
fn test_dropped_watcher_is_pruned() {
    let store = Store::from_json(json!({"a": 1})).unwrap();
    let (watcher, seen) = recorder(&store, "a");
    drop(watcher);

    store.set("a", 2).unwrap();
    assert!(seen.borrow().is_empty());
    assert!(store.root().dep("a").unwrap().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════
// Replaced Objects
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_new_nested_object_is_reactive() {
    let store = Store::from_json(json!({"user": {"name": "a"}})).unwrap();
    let (_watcher, seen) = recorder(&store, "user.name");

    store
        .set("user", Value::from(json!({"name": "b"})))
        .unwrap();
    assert!(store.get("user").unwrap().as_object().unwrap().is_observed());

    store.set("user.name", "c").unwrap();
    assert_eq!(*seen.borrow(), vec![Value::from("b"), Value::from("c")]);
}

#[test]
fn test_replaced_object_no_longer_drives_watcher() {
    let store = Store::from_json(json!({"user": {"name": "a"}})).unwrap();
    let old = store.get("user").unwrap().as_object().unwrap().clone();
    let (_watcher, seen) = recorder(&store, "user.name");

    store
        .set("user", Value::from(json!({"name": "b"})))
        .unwrap();
    old.set("name", "stale").unwrap();

    assert_eq!(*seen.borrow(), vec![Value::from("b")]);
    assert_eq!(store.get("user.name").unwrap(), Value::from("b"));
}

#[test]
fn test_key_added_later_wakes_watcher() {
    let store = Store::from_json(json!({})).unwrap();
    let (_watcher, seen) = recorder(&store, "later.value");

    store.set("later", Value::from(json!({"value": 1}))).unwrap();
    store.set("later.value", 2).unwrap();
    assert_eq!(*seen.borrow(), vec![Value::Int(1), Value::Int(2)]);
}

#[test]
fn test_objects_inside_lists_are_observed() {
    let store = Store::from_json(json!({"rows": [{"id": 1}]})).unwrap();
    let rows = store.get("rows").unwrap();
    let first = rows.as_list().unwrap()[0].as_object().unwrap().clone();
    assert!(first.is_observed());
}

// ═══════════════════════════════════════════════════════════════════════
// Cycles
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_cyclic_graph_is_instrumented_once() {
    let a = Object::new().with("name", "a");
    let b = Object::new().with("back", a.clone());
    a.set("next", b.clone()).unwrap();

    let mut observer = Observer::new();
    observer.observe(&Value::Object(a.clone()));
    assert_eq!(observer.instrumented(), 2);
    assert!(a.is_observed());
    assert!(b.is_observed());
}

#[test]
fn test_cyclic_store_reads_and_refuses_export() {
    let store = Store::from_json(json!({"node": {"name": "n"}})).unwrap();
    let node = store.get("node").unwrap();
    store.set("node.self", node).unwrap();

    assert_eq!(store.get("node.self.self.name").unwrap(), Value::from("n"));
    assert!(matches!(
        store.snapshot(),
        Err(BindError::Cycle { ref path }) if path == "node.self"
    ));
}

// ═══════════════════════════════════════════════════════════════════════
// Failures
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_failing_watcher_does_not_starve_others() {
    let store = Store::from_json(json!({"a": 1})).unwrap();
    let failing = Watcher::new(&store, path("a"), |_| Err(anyhow::anyhow!("boom")));
    let (_ok, seen) = recorder(&store, "a");

    let notify = match store.set("a", 2) {
        Err(BindError::Notify(notify)) => notify,
        other => panic!("expected notify error, got {other:?}"),
    };
    assert_eq!(notify.failures.len(), 1);
    assert_eq!(notify.failures[0].watcher, failing.id());
    assert_eq!(notify.failures[0].expression, "a");

    assert_eq!(*seen.borrow(), vec![Value::Int(2)]);
    assert_eq!(store.get("a").unwrap(), Value::Int(2));
}

#[test]
fn test_reentrant_write_from_callback() {
    let store = Store::from_json(json!({"a": 1, "b": 0})).unwrap();
    let inner = store.clone();
    let _mirror = Watcher::new(&store, path("a"), move |value| {
        inner.set("b", value.clone())?;
        Ok(())
    });
    let (_watch_b, seen) = recorder(&store, "b");

    store.set("a", 7).unwrap();
    assert_eq!(store.get("b").unwrap(), Value::Int(7));
    assert_eq!(*seen.borrow(), vec![Value::Int(7)]);
}

//! Watchers: tracked property paths with change callbacks

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::context::EvalContext;
use crate::eval::PropertyPath;
use crate::store::Store;
use crate::value::Value;

static NEXT_WATCHER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`Watcher`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatcherId(u64);

impl WatcherId {
    fn next() -> Self {
        Self(NEXT_WATCHER_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[cfg(test)]
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for WatcherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Change callback invoked with a watcher's new value
pub type Callback = Box<dyn Fn(&Value) -> anyhow::Result<()>>;

/// A property path evaluated against a store, re-evaluated whenever a
/// property it read changes.
///
/// Creation evaluates the path once with tracking enabled, which subscribes
/// the watcher to every dependency along the path, and caches the result.
/// Each [`update`](Watcher::update) evaluates again (tracking again, so
/// objects swapped in since the last run are picked up) and fires the
/// callback only if the result differs from the cached value. The cache
/// holds the new value before the callback runs, so a callback that writes
/// back into the store, or a repeated notification, does not fire it again
/// for the same value.
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use vbind::{PropertyPath, Store, Value, Watcher};
///
/// let store = Store::from_json(serde_json::json!({"user": {"name": "Ada"}})).unwrap();
/// let seen = Rc::new(RefCell::new(Vec::new()));
///
/// let log = Rc::clone(&seen);
/// let path = PropertyPath::parse("user.name").unwrap();
/// let watcher = Watcher::new(&store, path, move |value| {
///     log.borrow_mut().push(value.to_string());
///     Ok(())
/// });
/// assert_eq!(watcher.value(), Value::from("Ada"));
///
/// store.set("user.name", "Grace").unwrap();
/// store.set("user.name", "Grace").unwrap();
/// assert_eq!(*seen.borrow(), vec!["Grace"]);
/// ```
pub struct Watcher {
    id: WatcherId,
    path: PropertyPath,
    store: Store,
    callback: Callback,

    /// Last observed value
    value: RefCell<Value>,

    this: Weak<Watcher>,
}

impl Watcher {
    /// Create a watcher and run its first, tracked evaluation.
    pub fn new(
        store: &Store,
        path: PropertyPath,
        callback: impl Fn(&Value) -> anyhow::Result<()> + 'static,
    ) -> Rc<Self> {
        let watcher = Rc::new_cyclic(|this| Watcher {
            id: WatcherId::next(),
            path,
            store: store.clone(),
            callback: Box::new(callback),
            value: RefCell::new(Value::Undefined),
            this: this.clone(),
        });

        let initial = watcher.evaluate();
        watcher.value.replace(initial);
        tracing::debug!(watcher = %watcher.id, expression = %watcher.path, "watcher created");
        watcher
    }

    fn evaluate(&self) -> Value {
        let ctx = EvalContext::for_watcher(self.id, self.this.clone());
        self.store.read(&self.path, &ctx)
    }

    /// Re-evaluate and fire the callback if the value changed.
    ///
    /// # Errors
    ///
    /// Returns whatever the callback returned.
    pub fn update(&self) -> anyhow::Result<()> {
        let value = self.evaluate();
        if *self.value.borrow() == value {
            return Ok(());
        }

        self.value.replace(value.clone());
        tracing::trace!(watcher = %self.id, expression = %self.path, "value changed");
        (self.callback)(&value)
    }

    /// This watcher's identity
    pub fn id(&self) -> WatcherId {
        self.id
    }

    /// The path this watcher evaluates
    pub fn path(&self) -> &PropertyPath {
        &self.path
    }

    /// The cached last observed value
    pub fn value(&self) -> Value {
        self.value.borrow().clone()
    }
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher")
            .field("id", &self.id)
            .field("path", &self.path.as_str())
            .field("value", &*self.value.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counting_watcher(store: &Store, path: &str) -> (Rc<Watcher>, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let watcher = Watcher::new(store, PropertyPath::parse(path).unwrap(), move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });
        (watcher, calls)
    }

    #[test]
    fn test_initial_value_is_cached() {
        let store = Store::from_json(serde_json::json!({"a": 1})).unwrap();
        let (watcher, calls) = counting_watcher(&store, "a");
        assert_eq!(watcher.value(), Value::Int(1));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_creation_subscribes_along_the_path() {
        let store = Store::from_json(serde_json::json!({"a": {"b": 1}})).unwrap();
        let (watcher, _) = counting_watcher(&store, "a.b");

        let a_dep = store.root().dep("a").unwrap();
        assert!(a_dep.contains(watcher.id()));

        let a = store.get("a").unwrap();
        let b_dep = a.as_object().unwrap().dep("b").unwrap();
        assert!(b_dep.contains(watcher.id()));
    }

    #[test]
    fn test_update_without_change_does_not_fire() {
        let store = Store::from_json(serde_json::json!({"a": 1})).unwrap();
        let (watcher, calls) = counting_watcher(&store, "a");

        watcher.update().unwrap();
        watcher.update().unwrap();
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_repeated_notification_fires_once() {
        let store = Store::from_json(serde_json::json!({"a": 1})).unwrap();
        let (watcher, calls) = counting_watcher(&store, "a");

        store.set("a", 2).unwrap();
        assert_eq!(calls.get(), 1);

        store.root().dep("a").unwrap().notify().unwrap();
        watcher.update().unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(watcher.value(), Value::Int(2));
    }

    #[test]
    fn test_dropped_watcher_is_not_notified() {
        let store = Store::from_json(serde_json::json!({"a": 1})).unwrap();
        let (watcher, calls) = counting_watcher(&store, "a");
        drop(watcher);

        store.set("a", 2).unwrap();
        assert_eq!(calls.get(), 0);
        assert!(store.root().dep("a").unwrap().is_empty());
    }
}

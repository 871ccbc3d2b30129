//! Recursive instrumentation of object graphs

use std::collections::HashSet;

use crate::value::{Object, ObjectId, Value};

/// Walks a value and instruments every object reachable from it.
///
/// Objects are visited at most once per walk, keyed by identity, so cyclic
/// graphs and shared sub-objects terminate. An object that was instrumented
/// by an earlier walk is not descended into again: whatever it holds was
/// instrumented when it was written.
///
/// # Example
///
/// ```
/// use vbind::{Object, Observer, Value};
///
/// let leaf = Object::new().with("n", 1);
/// let root = Object::new().with("a", leaf.clone()).with("b", leaf.clone());
///
/// let mut observer = Observer::new();
/// observer.observe(&Value::from(root.clone()));
///
/// assert!(root.is_observed());
/// assert!(leaf.is_observed());
/// assert_eq!(observer.instrumented(), 2);
/// ```
#[derive(Debug, Default)]
pub struct Observer {
    visited: HashSet<ObjectId>,
    instrumented: usize,
}

impl Observer {
    /// Create an observer with an empty visited set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Instrument `value` and everything reachable from it.
    ///
    /// Lists are walked so objects inside them are instrumented, but the
    /// list itself is immutable and is only ever replaced as a whole.
    pub fn observe(&mut self, value: &Value) {
        match value {
            Value::Object(obj) => self.observe_object(obj),
            Value::List(items) => {
                for item in items.iter() {
                    self.observe(item);
                }
            }
            _ => {}
        }
    }

    fn observe_object(&mut self, obj: &Object) {
        if !self.visited.insert(obj.id()) {
            return;
        }
        if !obj.mark_observed() {
            return;
        }
        self.instrumented += 1;
        for value in obj.values() {
            self.observe(&value);
        }
    }

    /// Number of objects newly instrumented by this observer
    pub fn instrumented(&self) -> usize {
        self.instrumented
    }
}

/// Instrument `value` and everything reachable from it.
pub fn observe(value: &Value) {
    Observer::new().observe(value);
}

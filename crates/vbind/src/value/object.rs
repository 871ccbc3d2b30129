//! Shared property maps with per-property dependency tracking

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::map::Entry;
use indexmap::IndexMap;

use super::Value;
use crate::context::EvalContext;
use crate::error::NotifyError;
use crate::reactive::{observe, Dep};

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an [`Object`], stable for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A shared, insertion-ordered property map.
///
/// Cloning an `Object` clones the handle, not the properties. An object
/// starts out *plain*: reads are not tracked and writes notify nobody. Once
/// the observer instruments it, every read through a tracking
/// [`EvalContext`] subscribes the context's watcher to the property's
/// [`Dep`], and every write that changes a value notifies that `Dep`.
///
/// # Example
///
/// ```
/// use vbind::{Object, Value};
///
/// let user = Object::new()
///     .with("name", "Ada")
///     .with("age", 36);
///
/// assert_eq!(user.peek("name"), Some(Value::from("Ada")));
/// assert_eq!(user.keys(), vec!["name", "age"]);
/// ```
#[derive(Clone)]
pub struct Object(Rc<ObjectData>);

struct ObjectData {
    id: ObjectId,
    observed: Cell<bool>,

    /// Notified when a key is added; tracked by reads that miss
    shape: Dep,

    properties: RefCell<IndexMap<String, Property>>,
}

struct Property {
    value: Value,
    dep: Dep,
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl Object {
    /// Create an empty plain object.
    pub fn new() -> Self {
        Self(Rc::new(ObjectData {
            id: ObjectId(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed)),
            observed: Cell::new(false),
            shape: Dep::new(),
            properties: RefCell::new(IndexMap::new()),
        }))
    }

    /// Add a property (builder pattern).
    ///
    /// Meant for assembling data before it is handed to a store. On an
    /// object that is already instrumented the value is instrumented too,
    /// but no subscriber is notified; use [`Object::set`] there.
    pub fn with(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        if self.is_observed() {
            observe(&value);
        }
        self.0
            .properties
            .borrow_mut()
            .insert(key.into(), Property::new(value));
        self
    }

    /// This object's identity
    pub fn id(&self) -> ObjectId {
        self.0.id
    }

    /// Check whether two handles refer to the same object
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Check whether the observer has instrumented this object
    pub fn is_observed(&self) -> bool {
        self.0.observed.get()
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.0.properties.borrow().len()
    }

    /// Check if the object has no properties
    pub fn is_empty(&self) -> bool {
        self.0.properties.borrow().is_empty()
    }

    /// Property names in insertion order
    pub fn keys(&self) -> Vec<String> {
        self.0.properties.borrow().keys().cloned().collect()
    }

    /// Check if a property exists (untracked)
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.properties.borrow().contains_key(key)
    }

    /// Read a property.
    ///
    /// When the object is instrumented and `ctx` is tracking, the tracked
    /// watcher is registered with the property's dependency, or with the
    /// object's shape dependency if the property does not exist yet.
    pub fn get(&self, key: &str, ctx: &EvalContext) -> Option<Value> {
        let properties = self.0.properties.borrow();
        let target = if self.is_observed() { ctx.target() } else { None };

        match properties.get(key) {
            Some(property) => {
                if let Some(target) = target {
                    property.dep.depend(target);
                }
                Some(property.value.clone())
            }
            None => {
                if let Some(target) = target {
                    self.0.shape.depend(target);
                }
                None
            }
        }
    }

    /// Read a property without tracking.
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.get(key, &EvalContext::untracked())
    }

    /// Write a property.
    ///
    /// On an instrumented object the new value is instrumented before it is
    /// stored, then subscribers are notified synchronously: the property's
    /// dependency if the value changed, the shape dependency if the key is
    /// new. Writing a value equal to the current one notifies nobody.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` if any subscriber failed. The write has been
    /// applied either way.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<(), NotifyError> {
        let key = key.into();
        let value = value.into();
        let observed = self.is_observed();
        if observed {
            observe(&value);
        }

        let mut properties = self.0.properties.borrow_mut();
        let changed = match properties.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                let property = entry.get_mut();
                if property.value == value {
                    None
                } else {
                    property.value = value;
                    Some(property.dep.clone())
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(Property::new(value));
                Some(self.0.shape.clone())
            }
        };
        drop(properties);

        match changed {
            Some(dep) if observed => {
                tracing::trace!(object = %self.id(), key = %key, "property changed");
                dep.notify()
            }
            _ => Ok(()),
        }
    }

    /// The dependency guarding `key`, if the property exists.
    pub fn dep(&self, key: &str) -> Option<Dep> {
        self.0
            .properties
            .borrow()
            .get(key)
            .map(|property| property.dep.clone())
    }

    /// The dependency notified when a key is added.
    pub fn shape_dep(&self) -> Dep {
        self.0.shape.clone()
    }

    /// Mark as instrumented. Returns `false` if it already was.
    pub(crate) fn mark_observed(&self) -> bool {
        !self.0.observed.replace(true)
    }

    /// Snapshot of the property values, for walking without holding a borrow.
    pub(crate) fn values(&self) -> Vec<Value> {
        self.0
            .properties
            .borrow()
            .values()
            .map(|property| property.value.clone())
            .collect()
    }

    /// Snapshot of the properties, for walking without holding a borrow.
    pub(crate) fn entries(&self) -> Vec<(String, Value)> {
        self.0
            .properties
            .borrow()
            .iter()
            .map(|(key, property)| (key.clone(), property.value.clone()))
            .collect()
    }
}

impl Property {
    fn new(value: Value) -> Self {
        Self {
            value,
            dep: Dep::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_object_is_plain_and_empty() {
        let obj = Object::new();
        assert!(obj.is_empty());
        assert!(!obj.is_observed());
        assert_eq!(obj.len(), 0);
    }

    #[test]
    fn test_objects_have_distinct_ids() {
        let a = Object::new();
        let b = Object::new();
        assert_ne!(a.id(), b.id());
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn test_with_preserves_insertion_order() {
        let obj = Object::new().with("z", 1).with("a", 2).with("m", 3);
        assert_eq!(obj.keys(), vec!["z", "a", "m"]);
    }

    #[test]
    fn test_plain_set_creates_property_with_dep() {
        let obj = Object::new();
        obj.set("x", 1).unwrap();
        assert_eq!(obj.peek("x"), Some(Value::Int(1)));
        assert!(obj.dep("x").is_some());
        assert!(obj.dep("y").is_none());
    }

    #[test]
    fn test_mark_observed_reports_first_time_only() {
        let obj = Object::new();
        assert!(obj.mark_observed());
        assert!(!obj.mark_observed());
        assert!(obj.is_observed());
    }
}

//! The reactive store: an instrumented root object

use crate::context::EvalContext;
use crate::error::{type_name, BindError, Result};
use crate::eval::PropertyPath;
use crate::reactive::Observer;
use crate::value::{Object, Value};

/// An instrumented root object.
///
/// Construction instruments the whole data graph; every later write goes
/// through instrumented setters, so nothing plain is ever reachable from
/// the root. Cloning a `Store` clones the handle.
///
/// # Example
///
/// ```
/// use vbind::{Store, Value};
///
/// let store = Store::from_json(serde_json::json!({"user": {"name": "Ada"}})).unwrap();
/// store.set("user.name", "Grace").unwrap();
/// assert_eq!(store.get("user.name").unwrap(), Value::from("Grace"));
/// assert!(store.get("user.email").unwrap().is_undefined());
/// ```
#[derive(Debug, Clone)]
pub struct Store {
    root: Object,
}

impl Store {
    /// Instrument `data` and wrap it as a store.
    ///
    /// `Undefined` data produces an empty store.
    ///
    /// # Errors
    ///
    /// Returns `DataNotObject` if `data` is neither an object nor undefined.
    pub fn new(data: Value) -> Result<Self> {
        let root = match data {
            Value::Object(root) => root,
            Value::Undefined => Object::new(),
            other => {
                return Err(BindError::DataNotObject {
                    found: type_name(&other),
                })
            }
        };

        let mut observer = Observer::new();
        observer.observe(&Value::Object(root.clone()));
        tracing::debug!(
            objects = observer.instrumented(),
            keys = root.len(),
            "store instrumented"
        );
        Ok(Self { root })
    }

    /// Build a store from JSON data.
    ///
    /// # Errors
    ///
    /// Returns `DataNotObject` if `json` is not a JSON object.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        Self::new(Value::from(json))
    }

    /// The root object
    pub fn root(&self) -> &Object {
        &self.root
    }

    /// Resolve a parsed path, tracking through `ctx`.
    pub fn read(&self, path: &PropertyPath, ctx: &EvalContext) -> Value {
        path.read(&self.root, ctx)
    }

    /// Assign through a parsed path.
    ///
    /// # Errors
    ///
    /// See [`PropertyPath::write`].
    pub fn write(&self, path: &PropertyPath, value: Value) -> Result<()> {
        path.write(&self.root, value)
    }

    /// Parse `path` and read it without tracking.
    ///
    /// # Errors
    ///
    /// Returns a `Path` error if `path` does not parse. A path that parses
    /// but does not resolve yields `Ok(Value::Undefined)`.
    pub fn get(&self, path: &str) -> Result<Value> {
        Ok(self.read(&PropertyPath::parse(path)?, &EvalContext::untracked()))
    }

    /// Parse `path` and assign through it.
    ///
    /// # Errors
    ///
    /// See [`PropertyPath::write`].
    pub fn set(&self, path: &str, value: impl Into<Value>) -> Result<()> {
        self.write(&PropertyPath::parse(path)?, value.into())
    }

    /// Export the current data as JSON.
    ///
    /// # Errors
    ///
    /// Returns `Cycle` if the data refers back to itself.
    pub fn snapshot(&self) -> Result<serde_json::Value> {
        Value::Object(self.root.clone()).to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_instruments_everything() {
        let store = Store::from_json(json!({"a": {"b": {"c": 1}}})).unwrap();
        assert!(store.root().is_observed());
        let b = store.get("a.b").unwrap();
        assert!(b.as_object().unwrap().is_observed());
    }

    #[test]
    fn test_undefined_data_is_empty_store() {
        let store = Store::new(Value::Undefined).unwrap();
        assert!(store.root().is_empty());
    }

    #[test]
    fn test_non_object_data_is_rejected() {
        let err = Store::from_json(json!([1, 2])).unwrap_err();
        assert!(matches!(err, BindError::DataNotObject { found: "list" }));
    }

    #[test]
    fn test_get_reports_parse_errors() {
        let store = Store::new(Value::Undefined).unwrap();
        assert!(matches!(store.get("a..b"), Err(BindError::Path(_))));
    }

    #[test]
    fn test_snapshot() {
        let data = json!({"msg": "hi", "n": {"v": 2}});
        let store = Store::from_json(data.clone()).unwrap();
        assert_eq!(store.snapshot().unwrap(), data);
    }
}

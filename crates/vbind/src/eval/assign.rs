//! Assignment through a property path

use super::PropertyPath;
use crate::context::EvalContext;
use crate::error::{type_name, BindError, PathError};
use crate::value::{Object, Value};

impl PropertyPath {
    /// Assign `value` at this path under `root`.
    ///
    /// Walks every segment but the last (untracked) to find the owning
    /// object, then writes the last segment through [`Object::set`], which
    /// instruments the value and notifies subscribers.
    ///
    /// # Errors
    ///
    /// - `Missing` if an intermediate segment does not exist
    /// - `NotAnObject` if an intermediate segment is not an object
    /// - `Notify` if a subscriber failed (the value is written regardless)
    pub fn write(&self, root: &Object, value: Value) -> Result<(), BindError> {
        let ctx = EvalContext::untracked();
        let (last, parents) = self
            .segments()
            .split_last()
            .ok_or(PathError::Empty)?;

        let mut owner = root.clone();
        for segment in parents {
            owner = match owner.get(segment, &ctx) {
                Some(Value::Object(next)) => next,
                Some(other) => {
                    return Err(PathError::NotAnObject {
                        path: self.as_str().to_string(),
                        segment: segment.clone(),
                        found: type_name(&other),
                    }
                    .into())
                }
                None => {
                    return Err(PathError::Missing {
                        path: self.as_str().to_string(),
                        segment: segment.clone(),
                    }
                    .into())
                }
            };
        }

        owner.set(last.clone(), value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> PropertyPath {
        PropertyPath::parse(s).unwrap()
    }

    #[test]
    fn test_write_top_level() {
        let root = Object::new().with("a", 1);
        path("a").write(&root, Value::Int(2)).unwrap();
        assert_eq!(root.peek("a"), Some(Value::Int(2)));
    }

    #[test]
    fn test_write_nested() {
        let inner = Object::new().with("b", 1);
        let root = Object::new().with("a", inner.clone());
        path("a.b").write(&root, Value::from("x")).unwrap();
        assert_eq!(inner.peek("b"), Some(Value::from("x")));
    }

    #[test]
    fn test_write_creates_final_key() {
        let root = Object::new().with("a", Object::new());
        path("a.fresh").write(&root, Value::Bool(true)).unwrap();
        assert_eq!(
            path("a.fresh").read(&root, &EvalContext::untracked()),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_write_missing_intermediate() {
        let root = Object::new();
        let err = path("a.b").write(&root, Value::Int(1)).unwrap_err();
        assert!(matches!(
            err,
            BindError::Path(PathError::Missing { ref segment, .. }) if segment == "a"
        ));
    }

    #[test]
    fn test_write_through_primitive() {
        let root = Object::new().with("a", 5);
        let err = path("a.b").write(&root, Value::Int(1)).unwrap_err();
        assert!(matches!(
            err,
            BindError::Path(PathError::NotAnObject { found: "int", .. })
        ));
    }
}

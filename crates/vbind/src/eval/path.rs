//! Path evaluation (property lookup)

use std::fmt;
use std::str::FromStr;

use crate::context::EvalContext;
use crate::error::PathError;
use crate::value::{Object, Value};

/// A parsed dotted property path.
///
/// Each segment is an identifier: a letter, `_` or `$`, followed by
/// letters, digits, `_` or `$`. Surrounding whitespace is trimmed; there are
/// no indices, literals or operators.
///
/// # Example
///
/// ```
/// use vbind::PropertyPath;
///
/// let path = PropertyPath::parse(" user.address.city ").unwrap();
/// assert_eq!(path.segments(), ["user", "address", "city"]);
/// assert_eq!(path.as_str(), "user.address.city");
///
/// assert!(PropertyPath::parse("user..city").is_err());
/// assert!(PropertyPath::parse("items[0]").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    source: String,
    segments: Vec<String>,
}

impl PropertyPath {
    /// Parse a dotted path.
    ///
    /// # Errors
    ///
    /// Returns `Empty` for a blank path and `InvalidSegment` for any segment
    /// that is not an identifier.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let source = input.trim();
        if source.is_empty() {
            return Err(PathError::Empty);
        }

        let segments = source
            .split('.')
            .map(|segment| {
                if is_identifier(segment) {
                    Ok(segment.to_string())
                } else {
                    Err(PathError::InvalidSegment {
                        path: source.to_string(),
                        segment: segment.to_string(),
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The path's identifier segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The first segment: the top-level data key this path starts from
    pub fn root_key(&self) -> &str {
        &self.segments[0]
    }

    /// The trimmed path source
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Resolve the path against `root`.
    ///
    /// Every instrumented property read on the way is tracked through
    /// `ctx`. A missing segment, or a non-object where an object is needed,
    /// yields `Value::Undefined`.
    pub fn read(&self, root: &Object, ctx: &EvalContext) -> Value {
        let mut current = Value::Object(root.clone());
        for segment in &self.segments {
            let Value::Object(object) = current else {
                return Value::Undefined;
            };
            current = object.get(segment, ctx).unwrap_or_default();
        }
        current
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

impl FromStr for PropertyPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_segment() {
        let path = PropertyPath::parse("msg").unwrap();
        assert_eq!(path.segments(), ["msg"]);
        assert_eq!(path.root_key(), "msg");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let path: PropertyPath = "  person.name\t".parse().unwrap();
        assert_eq!(path.to_string(), "person.name");
    }

    #[test]
    fn test_parse_accepts_underscore_and_dollar() {
        assert!(PropertyPath::parse("_private.$ref.a1").is_ok());
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(PropertyPath::parse("   "), Err(PathError::Empty));
    }

    #[test]
    fn test_parse_rejects_bad_segments() {
        for bad in ["a..b", ".a", "a.", "1a", "a-b", "a b", "a[0]", "f()"] {
            assert!(
                matches!(PropertyPath::parse(bad), Err(PathError::InvalidSegment { .. })),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_read_nested() {
        let root = Object::new().with("a", Object::new().with("b", 7));
        let path = PropertyPath::parse("a.b").unwrap();
        assert_eq!(path.read(&root, &EvalContext::untracked()), Value::Int(7));
    }

    #[test]
    fn test_read_missing_is_undefined() {
        let root = Object::new().with("a", 1);
        let ctx = EvalContext::untracked();
        assert!(PropertyPath::parse("b").unwrap().read(&root, &ctx).is_undefined());
        assert!(PropertyPath::parse("b.c.d").unwrap().read(&root, &ctx).is_undefined());
        assert!(PropertyPath::parse("a.c").unwrap().read(&root, &ctx).is_undefined());
    }
}

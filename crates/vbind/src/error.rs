//! Error types for vbind binding and notification

use thiserror::Error;

use crate::reactive::WatcherId;
use crate::value::Value;

/// Main error type for vbind operations
#[derive(Error, Debug)]
pub enum BindError {
    /// A directive attribute names no registered handler
    #[error("Unknown directive `{name}`")]
    UnknownDirective {
        /// Directive name without prefix or qualifier
        name: String,
    },

    /// An event binding names a method absent from the method table
    #[error("Unknown method `{name}` bound to `{event}` event")]
    UnknownMethod {
        /// Method name as written in the attribute value
        name: String,
        /// Native event the method was bound to
        event: String,
    },

    /// A directive that needs an event qualifier was written without one
    #[error("Directive `{directive}` requires an event qualifier")]
    MissingQualifier {
        /// Directive name
        directive: String,
    },

    /// Instance data was not an object
    #[error("Data root must be an object, got {found}")]
    DataNotObject {
        /// Type of the value that was supplied
        found: &'static str,
    },

    /// Proxy access to a key that was not a top-level data property
    #[error("`{key}` is not a data property of this instance")]
    UnknownProperty {
        /// The requested key
        key: String,
    },

    /// Export of an object graph that refers back to itself
    #[error("Cannot export cyclic object graph at `{path}`")]
    Cycle {
        /// Dotted path where the cycle closes
        path: String,
    },

    /// Malformed or unresolvable expression path
    #[error(transparent)]
    Path(#[from] PathError),

    /// One or more watchers failed while a write was being propagated.
    ///
    /// The write itself has already been applied.
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// Errors parsing or resolving a dotted property path
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Path is empty after trimming
    #[error("Empty expression path")]
    Empty,

    /// Path contains a segment that is not an identifier
    #[error("Invalid segment `{segment}` in expression path `{path}`")]
    InvalidSegment {
        /// Full path source
        path: String,
        /// Offending segment
        segment: String,
    },

    /// An intermediate segment is absent on write
    #[error("Cannot resolve `{segment}` in `{path}`: property is missing")]
    Missing {
        /// Full path source
        path: String,
        /// Segment that could not be found
        segment: String,
    },

    /// An intermediate segment holds a non-object value on write
    #[error("Cannot resolve `{segment}` in `{path}`: expected object, got {found}")]
    NotAnObject {
        /// Full path source
        path: String,
        /// Segment holding the non-object value
        segment: String,
        /// Type found at that segment
        found: &'static str,
    },
}

/// Failures collected while notifying the subscribers of one dependency.
///
/// Every subscriber runs even when an earlier one fails.
#[derive(Error, Debug)]
#[error("{} watcher(s) failed during notification", .failures.len())]
pub struct NotifyError {
    /// One entry per failing watcher, in notification order
    pub failures: Vec<NotifyFailure>,
}

/// A single watcher callback failure
#[derive(Error, Debug)]
#[error("Watcher #{watcher} on `{expression}` failed: {source}")]
pub struct NotifyFailure {
    /// The failing watcher
    pub watcher: WatcherId,
    /// Expression the watcher tracks
    pub expression: String,
    /// Error returned by the callback
    pub source: anyhow::Error,
}

/// Result type alias for vbind operations
pub type Result<T> = std::result::Result<T, BindError>;

/// Get a human-readable type name for a value.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Undefined => "undefined",
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Int(_) => "int",
        Value::Float(_) => "float",
        Value::String(_) => "string",
        Value::List(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_error_message_counts_failures() {
        let err = NotifyError {
            failures: vec![NotifyFailure {
                watcher: WatcherId::from_raw(7),
                expression: "user.name".to_string(),
                source: anyhow::anyhow!("boom"),
            }],
        };
        assert_eq!(err.to_string(), "1 watcher(s) failed during notification");
        assert_eq!(
            err.failures[0].to_string(),
            "Watcher #7 on `user.name` failed: boom"
        );
    }

    #[test]
    fn test_path_error_converts_into_bind_error() {
        let err: BindError = PathError::Empty.into();
        assert!(matches!(err, BindError::Path(PathError::Empty)));
        assert_eq!(err.to_string(), "Empty expression path");
    }
}

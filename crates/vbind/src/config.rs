//! Binding syntax configuration

use serde::{Deserialize, Serialize};

/// Markers the compiler recognizes in a view tree.
///
/// Defaults give the usual grammar:
///
/// - directives: `v-<name>[:<qualifier>]="<path>"`
/// - event bindings: `@<event>="<method>"`
/// - interpolation: `{{ <path> }}`
///
/// Missing fields deserialize to their defaults, so a partial override is
/// enough:
///
/// ```
/// use vbind::Syntax;
///
/// let syntax: Syntax = serde_json::from_str(r#"{"open": "[[", "close": "]]"}"#).unwrap();
/// assert_eq!(syntax.open, "[[");
/// assert_eq!(syntax.directive_prefix, "v-");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Syntax {
    /// Prefix marking a directive attribute
    pub directive_prefix: String,

    /// Prefix marking an event-binding attribute
    pub event_prefix: String,

    /// Separator between a directive name and its qualifier
    pub qualifier_separator: String,

    /// Interpolation opening delimiter
    pub open: String,

    /// Interpolation closing delimiter
    pub close: String,
}

impl Default for Syntax {
    fn default() -> Self {
        Self {
            directive_prefix: "v-".to_string(),
            event_prefix: "@".to_string(),
            qualifier_separator: ":".to_string(),
            open: "{{".to_string(),
            close: "}}".to_string(),
        }
    }
}

/// How the compiler treats one element attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind<'a> {
    /// `v-<name>[:<qualifier>]`
    Directive {
        /// Directive name
        name: &'a str,
        /// Optional qualifier after the separator
        qualifier: Option<&'a str>,
    },

    /// `@<event>`
    Event {
        /// Native event name
        event: &'a str,
    },

    /// Anything else; left alone
    Plain,
}

impl Syntax {
    /// Classify an attribute name.
    pub fn classify<'a>(&self, attribute: &'a str) -> AttributeKind<'a> {
        if let Some(rest) = attribute.strip_prefix(self.directive_prefix.as_str()) {
            match rest.split_once(self.qualifier_separator.as_str()) {
                Some((name, qualifier)) => AttributeKind::Directive {
                    name,
                    qualifier: Some(qualifier),
                },
                None => AttributeKind::Directive {
                    name: rest,
                    qualifier: None,
                },
            }
        } else if let Some(event) = attribute.strip_prefix(self.event_prefix.as_str()) {
            AttributeKind::Event { event }
        } else {
            AttributeKind::Plain
        }
    }
}

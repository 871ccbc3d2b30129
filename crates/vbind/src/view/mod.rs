//! View tree interfaces
//!
//! The compiler never touches a concrete view technology. It walks any tree
//! implementing [`ViewNode`] and writes output through the [`ViewSink`]
//! capabilities of the bound node. [`memory`] provides an in-memory tree.

pub mod memory;

use std::rc::Rc;

/// Native event delivered to a listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event name (`input`, `click`, ...)
    pub name: String,

    /// Current value of the event's field, for field events
    pub value: Option<String>,
}

impl Event {
    /// Create an event without a value.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// Create an `input` event carrying a field value.
    pub fn input(value: impl Into<String>) -> Self {
        Self::new("input").with_value(value)
    }

    /// Attach a field value (builder pattern).
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Native event listener
pub type Listener = Rc<dyn Fn(&Event) -> anyhow::Result<()>>;

/// Wrap a closure as a [`Listener`].
pub fn listener(f: impl Fn(&Event) -> anyhow::Result<()> + 'static) -> Listener {
    Rc::new(f)
}

/// Output primitives of a bound node.
pub trait ViewSink {
    /// Replace the node's text content.
    fn render_text(&self, text: &str);

    /// Replace the node's content with markup.
    fn render_markup(&self, markup: &str);

    /// Set the displayed value of a form field.
    fn set_field_value(&self, value: &str);
}

/// Kind of a view node, as far as the compiler cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Element with attributes and children
    Element,

    /// Text content
    Text,

    /// Anything else (comments, processing instructions); skipped
    Other,
}

/// A node of a view tree the compiler can walk and bind.
///
/// Handles are cheap to clone and refer to the same underlying node.
pub trait ViewNode: ViewSink + Clone + 'static {
    /// The node's kind
    fn kind(&self) -> NodeKind;

    /// Attributes in document order, as `(name, value)`
    fn attributes(&self) -> Vec<(String, String)>;

    /// Remove an attribute by name. Does nothing if it is absent.
    fn remove_attribute(&self, name: &str);

    /// The node's text content
    fn text(&self) -> String;

    /// Child nodes in document order
    fn children(&self) -> Vec<Self>;

    /// Attach a listener for a native event.
    fn add_listener(&self, event: &str, listener: Listener);
}

//! In-memory view tree

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::{Event, Listener, NodeKind, ViewNode, ViewSink};

/// A node of an in-memory view tree.
///
/// Output mirrors a document tree: rendering text into an element replaces
/// its children with one text node, rendering markup stores the markup and
/// drops the children, and field values are kept separately from text.
///
/// # Example
///
/// ```
/// use vbind::view::memory::Node;
/// use vbind::view::ViewSink;
///
/// let root = Node::element("div")
///     .child(Node::element("p").attr("v-text", "msg"))
///     .child(Node::text("Hello {{ name }}"));
///
/// assert_eq!(root.children().len(), 2);
/// assert_eq!(root.children()[0].attribute("v-text").as_deref(), Some("msg"));
///
/// root.children()[1].render_text("Hello Ada");
/// assert_eq!(root.text_content(), "Hello Ada");
/// ```
#[derive(Clone)]
pub struct Node(Rc<RefCell<NodeData>>);

struct NodeData {
    kind: NodeKind,
    tag: String,
    attributes: IndexMap<String, String>,
    text: String,
    markup: Option<String>,
    field_value: String,
    children: Vec<Node>,
    listeners: Vec<(String, Listener)>,
}

impl Node {
    fn with_data(kind: NodeKind, tag: &str, text: &str) -> Self {
        Self(Rc::new(RefCell::new(NodeData {
            kind,
            tag: tag.to_string(),
            attributes: IndexMap::new(),
            text: text.to_string(),
            markup: None,
            field_value: String::new(),
            children: Vec::new(),
            listeners: Vec::new(),
        })))
    }

    /// Create an element.
    pub fn element(tag: &str) -> Self {
        Self::with_data(NodeKind::Element, tag, "")
    }

    /// Create a text node.
    pub fn text(content: &str) -> Self {
        Self::with_data(NodeKind::Text, "#text", content)
    }

    /// Create a comment node.
    pub fn comment(content: &str) -> Self {
        Self::with_data(NodeKind::Other, "#comment", content)
    }

    /// Set an attribute (builder pattern).
    pub fn attr(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Append a child (builder pattern).
    pub fn child(self, child: Node) -> Self {
        self.append(child);
        self
    }

    /// Append a child.
    pub fn append(&self, child: Node) {
        self.0.borrow_mut().children.push(child);
    }

    /// Set an attribute.
    pub fn set_attribute(&self, name: &str, value: &str) {
        self.0
            .borrow_mut()
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    /// Tag name (`#text` / `#comment` for non-elements)
    pub fn tag(&self) -> String {
        self.0.borrow().tag.clone()
    }

    /// Attribute value by name
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0.borrow().attributes.get(name).cloned()
    }

    /// Child nodes
    pub fn children(&self) -> Vec<Node> {
        self.0.borrow().children.clone()
    }

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        let data = self.0.borrow();
        match data.kind {
            NodeKind::Text => data.text.clone(),
            NodeKind::Other => String::new(),
            NodeKind::Element => data.children.iter().map(Node::text_content).collect(),
        }
    }

    /// Markup last rendered into this node
    pub fn markup(&self) -> Option<String> {
        self.0.borrow().markup.clone()
    }

    /// Displayed field value
    pub fn field_value(&self) -> String {
        self.0.borrow().field_value.clone()
    }

    /// Number of listeners attached for `event`
    pub fn listener_count(&self, event: &str) -> usize {
        self.0
            .borrow()
            .listeners
            .iter()
            .filter(|(name, _)| name == event)
            .count()
    }

    /// Deliver an event to this node's listeners, in attachment order.
    ///
    /// An event carrying a value also updates the displayed field value
    /// first, the way the user's edit would.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first listener error.
    pub fn dispatch(&self, event: &Event) -> anyhow::Result<()> {
        let listeners: Vec<Listener> = {
            let mut data = self.0.borrow_mut();
            if let Some(value) = &event.value {
                data.field_value = value.clone();
            }
            data.listeners
                .iter()
                .filter(|(name, _)| *name == event.name)
                .map(|(_, listener)| Rc::clone(listener))
                .collect()
        };

        for listener in listeners {
            listener(event)?;
        }
        Ok(())
    }
}

impl ViewSink for Node {
    fn render_text(&self, text: &str) {
        let mut data = self.0.borrow_mut();
        match data.kind {
            NodeKind::Element => {
                data.markup = None;
                data.children = vec![Node::text(text)];
            }
            _ => data.text = text.to_string(),
        }
    }

    fn render_markup(&self, markup: &str) {
        let mut data = self.0.borrow_mut();
        data.children.clear();
        data.markup = Some(markup.to_string());
    }

    fn set_field_value(&self, value: &str) {
        self.0.borrow_mut().field_value = value.to_string();
    }
}

impl ViewNode for Node {
    fn kind(&self) -> NodeKind {
        self.0.borrow().kind
    }

    fn attributes(&self) -> Vec<(String, String)> {
        self.0
            .borrow()
            .attributes
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    fn remove_attribute(&self, name: &str) {
        self.0.borrow_mut().attributes.shift_remove(name);
    }

    fn text(&self) -> String {
        self.0.borrow().text.clone()
    }

    fn children(&self) -> Vec<Self> {
        Node::children(self)
    }

    fn add_listener(&self, event: &str, listener: Listener) {
        self.0
            .borrow_mut()
            .listeners
            .push((event.to_string(), listener));
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        match data.kind {
            NodeKind::Element => f
                .debug_struct("Element")
                .field("tag", &data.tag)
                .field("attributes", &data.attributes)
                .field("children", &data.children)
                .finish(),
            _ => write!(f, "{}({:?})", data.tag, data.text),
        }
    }
}

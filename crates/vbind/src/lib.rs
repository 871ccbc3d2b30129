//! # vbind
//!
//! Reactive data binding between an object graph and a view tree.
//!
//! vbind instruments a plain data object so that reads are tracked and
//! writes are announced, then walks a view tree and binds each marker it
//! finds to a path in that data. When the data changes, exactly the bound
//! output that depends on it is refreshed.
//!
//! ## Architecture
//!
//! - **Reactive core**: [`Observer`] instruments data, [`Dep`] lists the
//!   [`Watcher`]s subscribed to one property, watchers re-evaluate their
//!   path and fire a callback on change
//! - **Evaluation**: [`PropertyPath`] reads and writes dotted paths,
//!   [`Template`] renders `{{ }}` interpolation
//! - **Compiler**: [`Compiler`] walks any [`ViewNode`] tree and dispatches
//!   directives to [`Directive`] handlers
//! - **Instance**: [`Instance`] ties data, methods, syntax and watchers
//!   together
//!
//! ## Example
//!
//! ```
//! use vbind::view::memory::Node;
//! use vbind::view::Event;
//! use vbind::{Instance, Options};
//!
//! let input = Node::element("input").attr("v-model", "msg");
//! let label = Node::element("p").child(Node::text("You typed: {{ msg }}"));
//! let root = Node::element("div").child(input.clone()).child(label.clone());
//!
//! let vm = Instance::mount(&root, Options::new().json(serde_json::json!({"msg": "hi"}))).unwrap();
//! assert_eq!(input.field_value(), "hi");
//! assert_eq!(label.text_content(), "You typed: hi");
//!
//! input.dispatch(&Event::input("hello")).unwrap();
//! assert_eq!(label.text_content(), "You typed: hello");
//!
//! vm.set("msg", "bye").unwrap();
//! assert_eq!(input.field_value(), "bye");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compiler;
pub mod config;
pub mod context;
pub mod error;
pub mod eval;
pub mod instance;
pub mod reactive;
pub mod store;
pub mod template;
pub mod value;
pub mod view;

// Re-export main types
pub use compiler::{Binding, Compiler, Directive, DirectiveRegistry};
pub use config::{AttributeKind, Syntax};
pub use context::EvalContext;
pub use error::{BindError, NotifyError, NotifyFailure, PathError, Result};
pub use eval::PropertyPath;
pub use instance::{Instance, Method, Options};
pub use reactive::{observe, Dep, Observer, Watcher, WatcherId};
pub use store::Store;
pub use template::{Template, TemplatePart};
pub use value::{Object, ObjectId, Value};
pub use view::{Event, Listener, NodeKind, ViewNode, ViewSink};

/// vbind version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}

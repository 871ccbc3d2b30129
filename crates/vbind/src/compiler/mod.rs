//! View compiler
//!
//! Walks a view tree once and turns binding markers into live bindings:
//!
//! ```text
//! element ─┬─ v-<name>[:<qualifier>]="expr"  → registry[name].bind(...)
//!          └─ @<event>="method"              → listener(instance.method)
//! text     ── "... {{ path }} ..."           → registry["text"].bind(...)
//! other    ── skipped
//! ```
//!
//! Binding markers are removed from elements once bound. Children are
//! collected before a node is bound, so content rendered by a binding is
//! never compiled as markup, and the children of an element whose content
//! a directive replaces are not compiled at all.

pub mod directive;

pub use directive::{Binding, Directive, DirectiveRegistry};

use crate::config::AttributeKind;
use crate::error::{BindError, Result};
use crate::instance::Instance;
use crate::template::Template;
use crate::view::{NodeKind, ViewNode};

/// Compiles a view tree against an instance.
pub struct Compiler<N: ViewNode> {
    instance: Instance,
    directives: DirectiveRegistry<N>,
}

impl<N: ViewNode> Compiler<N> {
    /// Create a compiler with the built-in directives.
    pub fn new(instance: &Instance) -> Self {
        Self {
            instance: instance.clone(),
            directives: DirectiveRegistry::builtin(),
        }
    }

    /// Register an additional directive handler (builder pattern).
    pub fn with_directive(
        mut self,
        name: impl Into<String>,
        handler: impl Directive<N> + 'static,
    ) -> Self {
        self.directives.register(name, handler);
        self
    }

    /// The directive handlers in use
    pub fn directives(&self) -> &DirectiveRegistry<N> {
        &self.directives
    }

    /// Compile every descendant of `root`. The root itself is not bound.
    ///
    /// # Errors
    ///
    /// Stops at the first failing binding. Bindings made before it stay in
    /// place.
    pub fn compile(&self, root: &N) -> Result<()> {
        for child in root.children() {
            self.compile_node(&child)?;
        }
        Ok(())
    }

    fn compile_node(&self, node: &N) -> Result<()> {
        let children = node.children();
        let owned = match node.kind() {
            NodeKind::Element => self.compile_element(node)?,
            NodeKind::Text => {
                self.compile_text(node)?;
                false
            }
            NodeKind::Other => false,
        };
        if owned {
            return Ok(());
        }
        for child in &children {
            self.compile_node(child)?;
        }
        Ok(())
    }

    /// Bind an element's markers. Returns `true` if a directive took over
    /// the element's content.
    fn compile_element(&self, node: &N) -> Result<bool> {
        let syntax = self.instance.syntax();
        let mut owned = false;
        for (name, value) in node.attributes() {
            match syntax.classify(&name) {
                AttributeKind::Directive {
                    name: directive,
                    qualifier,
                } => {
                    let handler =
                        self.directives
                            .get(directive)
                            .ok_or_else(|| BindError::UnknownDirective {
                                name: directive.to_string(),
                            })?;
                    tracing::debug!(directive, ?qualifier, expression = %value, "binding directive");
                    handler.bind(&Binding {
                        node,
                        expression: &value,
                        qualifier,
                        instance: &self.instance,
                    })?;
                    node.remove_attribute(&name);
                    owned |= handler.replaces_content();
                }
                AttributeKind::Event { event } => {
                    let method = value.trim();
                    tracing::debug!(event, method, "binding event");
                    node.add_listener(event, self.instance.bind_method(method, event)?);
                    node.remove_attribute(&name);
                }
                AttributeKind::Plain => {}
            }
        }
        Ok(owned)
    }

    fn compile_text(&self, node: &N) -> Result<()> {
        let content = node.text();
        if !Template::contains_interpolation(&content, self.instance.syntax()) {
            return Ok(());
        }
        let handler = self
            .directives
            .get("text")
            .ok_or_else(|| BindError::UnknownDirective {
                name: "text".to_string(),
            })?;
        tracing::debug!(expression = %content, "binding interpolated text");
        handler.bind(&Binding {
            node,
            expression: &content,
            qualifier: None,
            instance: &self.instance,
        })
    }
}

impl<N: ViewNode> std::fmt::Debug for Compiler<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler")
            .field("instance", &self.instance)
            .field("directives", &self.directives)
            .finish()
    }
}

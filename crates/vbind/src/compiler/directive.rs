//! Directive handlers
//!
//! A directive connects one node to one expression. The built-in set covers
//! the four bindings every view needs:
//!
//! | name    | binds                                      |
//! |---------|--------------------------------------------|
//! | `text`  | text content (path or interpolated text)   |
//! | `html`  | markup content                             |
//! | `model` | field value, two-way                       |
//! | `on`    | native event → instance method             |
//!
//! Handlers are looked up by name in a [`DirectiveRegistry`]; custom
//! handlers can be registered next to the built-ins or replace them.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::context::EvalContext;
use crate::error::{BindError, Result};
use crate::eval::PropertyPath;
use crate::instance::Instance;
use crate::template::Template;
use crate::value::Value;
use crate::view::{listener, ViewNode};

/// Everything a handler needs to bind one directive.
pub struct Binding<'a, N> {
    /// The node carrying the directive
    pub node: &'a N,

    /// The directive's expression (attribute value, or text content for
    /// interpolated text)
    pub expression: &'a str,

    /// Qualifier after the separator, e.g. `click` in `v-on:click`
    pub qualifier: Option<&'a str>,

    /// The instance being bound
    pub instance: &'a Instance,
}

impl<N> Binding<'_, N> {
    /// Parse the expression as a property path.
    pub fn path(&self) -> Result<PropertyPath> {
        Ok(PropertyPath::parse(self.expression)?)
    }
}

impl<N> fmt::Debug for Binding<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("expression", &self.expression)
            .field("qualifier", &self.qualifier)
            .finish_non_exhaustive()
    }
}

/// A directive handler.
///
/// Implemented for plain functions and closures taking a [`Binding`], so a
/// one-off handler does not need its own type.
pub trait Directive<N: ViewNode> {
    /// Bind the directive: render initial output and subscribe for changes.
    fn bind(&self, binding: &Binding<'_, N>) -> Result<()>;

    /// Whether the directive renders the node's whole content. The compiler
    /// does not descend into the children of such a node.
    fn replaces_content(&self) -> bool {
        false
    }
}

impl<N, F> Directive<N> for F
where
    N: ViewNode,
    F: Fn(&Binding<'_, N>) -> Result<()>,
{
    fn bind(&self, binding: &Binding<'_, N>) -> Result<()> {
        self(binding)
    }
}

/// Directive handlers by name.
pub struct DirectiveRegistry<N: ViewNode> {
    handlers: IndexMap<String, Rc<dyn Directive<N>>>,
}

impl<N: ViewNode> DirectiveRegistry<N> {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            handlers: IndexMap::new(),
        }
    }

    /// A registry holding the built-in handlers.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("text", TextDirective);
        registry.register("html", HtmlDirective);
        registry.register("model", ModelDirective);
        registry.register("on", OnDirective);
        registry
    }

    /// Register a handler, replacing any handler with the same name.
    pub fn register(&mut self, name: impl Into<String>, handler: impl Directive<N> + 'static) {
        self.handlers.insert(name.into(), Rc::new(handler));
    }

    /// Look up a handler.
    pub fn get(&self, name: &str) -> Option<Rc<dyn Directive<N>>> {
        self.handlers.get(name).cloned()
    }

    /// Registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

impl<N: ViewNode> Default for DirectiveRegistry<N> {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<N: ViewNode> fmt::Debug for DirectiveRegistry<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.handlers.keys()).finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Built-in Handlers
// ═══════════════════════════════════════════════════════════════════════

/// `v-text` and interpolated text nodes.
///
/// An expression containing interpolation tokens is treated as a template;
/// anything else is a single path. Every token gets its own watcher and any
/// change re-renders the whole text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDirective;

impl<N: ViewNode> Directive<N> for TextDirective {
    fn bind(&self, binding: &Binding<'_, N>) -> Result<()> {
        let instance = binding.instance;
        let syntax = instance.syntax();
        let template = if Template::contains_interpolation(binding.expression, syntax) {
            Template::parse(binding.expression, syntax)?
        } else {
            Template::expression(binding.path()?)
        };
        let template = Rc::new(template);

        for path in template.expressions() {
            let node = binding.node.clone();
            let template = Rc::clone(&template);
            let store = instance.store().clone();
            instance.watch(path.clone(), move |_| {
                node.render_text(&template.render(store.root(), &EvalContext::untracked()));
                Ok(())
            });
        }

        let text = template.render(instance.store().root(), &EvalContext::untracked());
        binding.node.render_text(&text);
        Ok(())
    }

    fn replaces_content(&self) -> bool {
        true
    }
}

/// `v-html`: renders the value's text form as markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlDirective;

impl<N: ViewNode> Directive<N> for HtmlDirective {
    fn bind(&self, binding: &Binding<'_, N>) -> Result<()> {
        let path = binding.path()?;
        let node = binding.node.clone();
        let watcher = binding.instance.watch(path, move |value| {
            node.render_markup(&value.to_string());
            Ok(())
        });
        binding.node.render_markup(&watcher.value().to_string());
        Ok(())
    }

    fn replaces_content(&self) -> bool {
        true
    }
}

/// `v-model[:<event>]`: keeps a field and a path in sync.
///
/// Data changes set the field value. The field's `input` event (or the
/// event named by the qualifier) writes the field value back to the path.
/// While that write propagates, only the echo of the written text is kept
/// off the field; any other value reaching the path still updates it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelDirective;

impl<N: ViewNode> Directive<N> for ModelDirective {
    fn bind(&self, binding: &Binding<'_, N>) -> Result<()> {
        let path = binding.path()?;
        let writing: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));

        let node = binding.node.clone();
        let pending = Rc::clone(&writing);
        let watcher = binding.instance.watch(path.clone(), move |value| {
            let text = value.to_string();
            let echo = pending.borrow().as_deref() == Some(text.as_str());
            if !echo {
                node.set_field_value(&text);
            }
            Ok(())
        });
        binding.node.set_field_value(&watcher.value().to_string());

        let event = binding.qualifier.unwrap_or("input");
        let store = binding.instance.store().clone();
        binding.node.add_listener(
            event,
            listener(move |event| {
                let text = event.value.clone().unwrap_or_default();
                let previous = writing.replace(Some(text.clone()));
                let written = store.write(&path, Value::from(text));
                writing.replace(previous);
                written.map_err(anyhow::Error::from)
            }),
        );
        Ok(())
    }
}

/// `v-on:<event>`: calls an instance method on a native event.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnDirective;

impl<N: ViewNode> Directive<N> for OnDirective {
    fn bind(&self, binding: &Binding<'_, N>) -> Result<()> {
        let event = binding
            .qualifier
            .ok_or_else(|| BindError::MissingQualifier {
                directive: "on".to_string(),
            })?;
        let method = binding.instance.bind_method(binding.expression.trim(), event)?;
        binding.node.add_listener(event, method);
        Ok(())
    }
}

//! Binding instances: store, methods and watchers behind one handle

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::compiler::Compiler;
use crate::config::Syntax;
use crate::error::{BindError, Result};
use crate::eval::PropertyPath;
use crate::reactive::Watcher;
use crate::store::Store;
use crate::value::Value;
use crate::view::{listener, Event, Listener, ViewNode};

/// A method callable from event bindings.
///
/// Receives the instance it was bound to and the native event.
pub type Method = Rc<dyn Fn(&Instance, &Event) -> anyhow::Result<()>>;

/// Construction options for an [`Instance`].
///
/// # Example
///
/// ```
/// use vbind::{Instance, Options};
///
/// let vm = Instance::new(
///     Options::new()
///         .json(serde_json::json!({"count": 0}))
///         .method("increment", |vm, _event| {
///             let count = vm.get("count").and_then(|v| v.as_i64()).unwrap_or(0);
///             vm.set("count", count + 1)?;
///             Ok(())
///         }),
/// )
/// .unwrap();
///
/// assert_eq!(vm.keys(), vec!["count"]);
/// ```
#[derive(Default)]
pub struct Options {
    data: Value,
    methods: IndexMap<String, Method>,
    syntax: Syntax,
}

impl Options {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the instance data.
    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.data = data.into();
        self
    }

    /// Set the instance data from JSON.
    pub fn json(self, data: serde_json::Value) -> Self {
        self.data(data)
    }

    /// Register a method.
    pub fn method(
        mut self,
        name: impl Into<String>,
        method: impl Fn(&Instance, &Event) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.methods.insert(name.into(), Rc::new(method));
        self
    }

    /// Override the binding syntax.
    pub fn syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("data", &self.data)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("syntax", &self.syntax)
            .finish()
    }
}

/// A bound instance.
///
/// Owns the store, the method table and every watcher created for its
/// bindings. Each top-level data key present at construction is exposed
/// through [`get`](Instance::get) and [`set`](Instance::set). Cloning
/// clones the handle.
#[derive(Clone)]
pub struct Instance {
    inner: Rc<InstanceInner>,
}

struct InstanceInner {
    store: Store,
    methods: IndexMap<String, Method>,
    syntax: Syntax,

    /// Top-level keys exposed on the instance
    proxied: Vec<String>,

    watchers: RefCell<Vec<Rc<Watcher>>>,
}

impl Instance {
    /// Instrument the data without binding a view.
    ///
    /// # Errors
    ///
    /// Returns `DataNotObject` if the data is not an object.
    pub fn new(options: Options) -> Result<Self> {
        let store = Store::new(options.data)?;
        let proxied = store.root().keys();
        Ok(Self {
            inner: Rc::new(InstanceInner {
                store,
                methods: options.methods,
                syntax: options.syntax,
                proxied,
                watchers: RefCell::new(Vec::new()),
            }),
        })
    }

    /// Instrument the data, then compile and bind the children of `root`.
    ///
    /// # Errors
    ///
    /// Returns the first construction or compile error. Bindings made
    /// before a compile error stay in place.
    pub fn mount<N: ViewNode>(root: &N, options: Options) -> Result<Self> {
        let instance = Self::new(options)?;
        Compiler::new(&instance).compile(root)?;
        tracing::debug!(watchers = instance.watcher_count(), "instance mounted");
        Ok(instance)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Data Proxy
    // ═══════════════════════════════════════════════════════════════════

    /// The top-level data keys exposed on this instance
    pub fn keys(&self) -> &[String] {
        &self.inner.proxied
    }

    /// Read a top-level data key.
    ///
    /// Returns `None` if `key` was not a data key at construction.
    pub fn get(&self, key: &str) -> Option<Value> {
        if !self.is_proxied(key) {
            return None;
        }
        Some(self.inner.store.root().peek(key).unwrap_or_default())
    }

    /// Write a top-level data key, notifying its subscribers.
    ///
    /// # Errors
    ///
    /// - `UnknownProperty` if `key` was not a data key at construction
    /// - `Notify` if a subscriber failed (the value is written regardless)
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        if !self.is_proxied(key) {
            return Err(BindError::UnknownProperty {
                key: key.to_string(),
            });
        }
        self.inner.store.root().set(key, value)?;
        Ok(())
    }

    fn is_proxied(&self, key: &str) -> bool {
        self.inner.proxied.iter().any(|k| k == key)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Store and Configuration
    // ═══════════════════════════════════════════════════════════════════

    /// The instance's store, for access by full path
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// The binding syntax in effect
    pub fn syntax(&self) -> &Syntax {
        &self.inner.syntax
    }

    /// Export the current data as JSON.
    ///
    /// # Errors
    ///
    /// Returns `Cycle` if the data refers back to itself.
    pub fn snapshot(&self) -> Result<serde_json::Value> {
        self.inner.store.snapshot()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Watchers
    // ═══════════════════════════════════════════════════════════════════

    /// Create a watcher on this instance's store and keep it alive for the
    /// instance's lifetime.
    pub fn watch(
        &self,
        path: PropertyPath,
        callback: impl Fn(&Value) -> anyhow::Result<()> + 'static,
    ) -> Rc<Watcher> {
        let watcher = Watcher::new(&self.inner.store, path, callback);
        self.inner.watchers.borrow_mut().push(Rc::clone(&watcher));
        watcher
    }

    /// Number of watchers owned by this instance
    pub fn watcher_count(&self) -> usize {
        self.inner.watchers.borrow().len()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Methods
    // ═══════════════════════════════════════════════════════════════════

    /// Look up a method by name.
    pub fn method(&self, name: &str) -> Option<Method> {
        self.inner.methods.get(name).cloned()
    }

    /// Resolve `name` now and return a listener that calls it bound to this
    /// instance.
    ///
    /// The listener holds the instance weakly; once the instance is dropped
    /// it does nothing.
    ///
    /// # Errors
    ///
    /// Returns `UnknownMethod` if `name` is not in the method table.
    pub fn bind_method(&self, name: &str, event: &str) -> Result<Listener> {
        let method = self.method(name).ok_or_else(|| BindError::UnknownMethod {
            name: name.to_string(),
            event: event.to_string(),
        })?;
        let instance = Rc::downgrade(&self.inner);
        Ok(listener(move |event| match Weak::upgrade(&instance) {
            Some(inner) => method(&Instance { inner }, event),
            None => Ok(()),
        }))
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("keys", &self.inner.proxied)
            .field("methods", &self.inner.methods.keys().collect::<Vec<_>>())
            .field("watchers", &self.watcher_count())
            .finish()
    }
}

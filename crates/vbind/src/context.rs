//! Evaluation context for dependency tracking

use std::fmt;
use std::rc::{Rc, Weak};

use crate::reactive::{Watcher, WatcherId};

/// Per-evaluation state passed into every property read.
///
/// A context either tracks on behalf of one [`Watcher`] or tracks nothing.
/// Reads of instrumented properties made through a tracking context register
/// the watcher with the property's [`Dep`](crate::reactive::Dep); reads made
/// through an untracked context are plain reads.
///
/// The context only lives for one synchronous evaluation, so two watchers
/// never share one.
#[derive(Clone, Default)]
pub struct EvalContext {
    target: Option<Target>,
}

/// The watcher a tracking context registers on read.
#[derive(Clone)]
pub struct Target {
    id: WatcherId,
    watcher: Weak<Watcher>,
}

impl Target {
    /// The tracked watcher's id
    pub fn id(&self) -> WatcherId {
        self.id
    }

    /// Weak handle to the tracked watcher
    pub fn watcher(&self) -> &Weak<Watcher> {
        &self.watcher
    }
}

impl EvalContext {
    /// Create a context that tracks nothing.
    pub fn untracked() -> Self {
        Self::default()
    }

    /// Create a context that registers `watcher` on every instrumented read.
    pub fn tracking(watcher: &Rc<Watcher>) -> Self {
        Self::for_watcher(watcher.id(), Rc::downgrade(watcher))
    }

    pub(crate) fn for_watcher(id: WatcherId, watcher: Weak<Watcher>) -> Self {
        Self {
            target: Some(Target { id, watcher }),
        }
    }

    /// The watcher being tracked, if any.
    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    /// Check if reads through this context are tracked.
    pub fn is_tracking(&self) -> bool {
        self.target.is_some()
    }
}

impl fmt::Debug for EvalContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Some(target) => write!(f, "EvalContext(tracking #{})", target.id),
            None => write!(f, "EvalContext(untracked)"),
        }
    }
}

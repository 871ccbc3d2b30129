//! Per-property subscriber sets

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use super::{Watcher, WatcherId};
use crate::context::Target;
use crate::error::{NotifyError, NotifyFailure};

static NEXT_DEP_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`Dep`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepId(u64);

/// The set of watchers that read one property.
///
/// Subscribers are held weakly and keyed by watcher id, so registering the
/// same watcher twice keeps one entry at its original position. Dead
/// entries are dropped lazily on the next notification.
#[derive(Clone)]
pub struct Dep(Rc<DepInner>);

struct DepInner {
    id: DepId,
    subscribers: RefCell<IndexMap<WatcherId, Weak<Watcher>>>,
}

impl Default for Dep {
    fn default() -> Self {
        Self::new()
    }
}

impl Dep {
    /// Create an empty dependency.
    pub fn new() -> Self {
        Self(Rc::new(DepInner {
            id: DepId(NEXT_DEP_ID.fetch_add(1, Ordering::Relaxed)),
            subscribers: RefCell::new(IndexMap::new()),
        }))
    }

    /// This dependency's identity
    pub fn id(&self) -> DepId {
        self.0.id
    }

    /// Subscribe a watcher. Does nothing if it is already subscribed.
    pub fn add_sub(&self, watcher: &Rc<Watcher>) {
        self.insert(watcher.id(), Rc::downgrade(watcher));
    }

    /// Subscribe the watcher a tracking context is evaluating for.
    pub fn depend(&self, target: &Target) {
        self.insert(target.id(), target.watcher().clone());
    }

    fn insert(&self, id: WatcherId, watcher: Weak<Watcher>) {
        let mut subscribers = self.0.subscribers.borrow_mut();
        if !subscribers.contains_key(&id) {
            tracing::trace!(dep = self.0.id.0, watcher = %id, "subscribed");
            subscribers.insert(id, watcher);
        }
    }

    /// Check if a watcher is subscribed.
    pub fn contains(&self, id: WatcherId) -> bool {
        self.0.subscribers.borrow().contains_key(&id)
    }

    /// Ids of the subscribed watchers, in registration order.
    pub fn subscribers(&self) -> Vec<WatcherId> {
        self.0.subscribers.borrow().keys().copied().collect()
    }

    /// Number of subscribed watchers
    pub fn len(&self) -> usize {
        self.0.subscribers.borrow().len()
    }

    /// Check if nothing is subscribed
    pub fn is_empty(&self) -> bool {
        self.0.subscribers.borrow().is_empty()
    }

    /// Run `update` on every live subscriber, in registration order.
    ///
    /// The subscriber list is snapshotted first, so subscribers may read and
    /// write the store (including this dependency) while being notified.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` listing every subscriber that failed. All
    /// subscribers run regardless.
    pub fn notify(&self) -> Result<(), NotifyError> {
        let watchers: Vec<Rc<Watcher>> = {
            let mut subscribers = self.0.subscribers.borrow_mut();
            subscribers.retain(|_, watcher| watcher.strong_count() > 0);
            subscribers.values().filter_map(Weak::upgrade).collect()
        };
        tracing::trace!(dep = self.0.id.0, count = watchers.len(), "notify");

        let mut failures = Vec::new();
        for watcher in watchers {
            if let Err(source) = watcher.update() {
                tracing::warn!(
                    watcher = %watcher.id(),
                    expression = %watcher.path(),
                    error = %source,
                    "watcher failed during notification"
                );
                failures.push(NotifyFailure {
                    watcher: watcher.id(),
                    expression: watcher.path().to_string(),
                    source,
                });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(NotifyError { failures })
        }
    }
}

impl fmt::Debug for Dep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dep")
            .field("id", &self.0.id.0)
            .field("subscribers", &self.subscribers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EvalContext;

    #[test]
    fn test_new_dep_is_empty() {
        let dep = Dep::new();
        assert!(dep.is_empty());
        assert!(dep.notify().is_ok());
    }

    #[test]
    fn test_depend_deduplicates_by_watcher_id() {
        let dep = Dep::new();
        let ctx = EvalContext::for_watcher(WatcherId::from_raw(1), Weak::new());
        let target = ctx.target().unwrap();

        dep.depend(target);
        dep.depend(target);

        assert_eq!(dep.len(), 1);
        assert!(dep.contains(WatcherId::from_raw(1)));
    }

    #[test]
    fn test_notify_drops_dead_subscribers() {
        let dep = Dep::new();
        let ctx = EvalContext::for_watcher(WatcherId::from_raw(9), Weak::new());
        dep.depend(ctx.target().unwrap());
        assert_eq!(dep.len(), 1);

        assert!(dep.notify().is_ok());
        assert!(dep.is_empty());
    }

    #[test]
    fn test_clones_share_subscribers() {
        let dep = Dep::new();
        let other = dep.clone();
        let ctx = EvalContext::for_watcher(WatcherId::from_raw(2), Weak::new());
        other.depend(ctx.target().unwrap());
        assert_eq!(dep.id(), other.id());
        assert_eq!(dep.subscribers(), vec![WatcherId::from_raw(2)]);
    }
}

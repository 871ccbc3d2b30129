//! Dependency tracking and change notification.
//!
//! - [`Dep`]: the ordered subscriber set guarding one property.
//! - [`Observer`]: instruments a plain object graph so reads track and writes
//!   notify.
//! - [`Watcher`]: a property path plus a callback, re-run when any property
//!   it read changes.
//!
//! # Architecture
//!
//! ```text
//! Watcher::new ──(EvalContext::tracking)──▶ PropertyPath::read
//!                                              │ Object::get
//!                                              ▼
//!                                          Dep::depend
//! Object::set ──▶ Dep::notify ──▶ Watcher::update ──▶ callback
//! ```
//!
//! Deps hold weak references; whoever creates a watcher owns it.
//!
//! # Invariants
//!
//! 1. A watcher appears at most once in any dep, in first-registration order.
//! 2. Subscribers are notified in registration order, synchronously.
//! 3. Writing a value equal to the current one notifies nobody.
//! 4. A failing subscriber never stops the remaining ones from running.
//! 5. A watcher's callback fires only when its value actually changed.
//! 6. Every object reachable from an instrumented object is instrumented.

mod dep;
mod observer;
mod watcher;

pub use dep::{Dep, DepId};
pub use observer::{observe, Observer};
pub use watcher::{Callback, Watcher, WatcherId};

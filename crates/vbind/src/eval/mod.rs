//! Expression evaluation
//!
//! Expressions are dotted property paths (`user.address.city`). A path is
//! parsed once into a [`PropertyPath`] when a binding is compiled, then
//! resolved against the store root on every evaluation.

pub mod assign;
pub mod path;

pub use path::PropertyPath;

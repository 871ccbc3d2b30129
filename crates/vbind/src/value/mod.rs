//! Value representation for store data

mod display;
mod impls;
mod object;

pub use object::{Object, ObjectId};

use std::rc::Rc;

/// A value held in a store.
///
/// Values are organized into two tiers:
/// - Tier 1: Inline primitives, compared by value
/// - Tier 2: Shared containers. Lists are immutable and compared by
///   contents; objects are mutable property maps compared by identity.
#[derive(Clone, Default)]
pub enum Value {
    // ═══════════════════════════════════════════════════════════════════
    // Tier 1: Inline Primitives
    // ═══════════════════════════════════════════════════════════════════
    /// No value: the result of reading a missing path
    #[default]
    Undefined,

    /// Explicit null
    Null,

    /// Boolean
    Bool(bool),

    /// 64-bit signed integer
    Int(i64),

    /// 64-bit floating point
    Float(f64),

    // ═══════════════════════════════════════════════════════════════════
    // Tier 2: Shared Containers
    // ═══════════════════════════════════════════════════════════════════
    /// Immutable string
    String(Rc<String>),

    /// Immutable sequence, replaced wholesale on write
    List(Rc<Vec<Value>>),

    /// Mutable property map
    Object(Object),
}

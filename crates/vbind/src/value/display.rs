//! Display and Debug implementations for Value

use std::fmt;

use super::*;

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, Style::Debug, &mut Vec::new())
    }
}

impl fmt::Display for Value {
    /// Render the value as view text.
    ///
    /// `Undefined` and `Null` render as empty text so a missing path never
    /// leaks a placeholder into the view; strings render without quotes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined | Value::Null => Ok(()),
            Value::String(s) => write!(f, "{}", s.as_ref()),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            _ => write_value(f, self, Style::Display, &mut Vec::new()),
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_object(f, self, Style::Debug, &mut Vec::new())
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Style {
    Debug,
    Display,
}

/// Write a value, tracking the objects currently being written so a cycle
/// prints a marker instead of recursing forever.
fn write_value(
    f: &mut fmt::Formatter<'_>,
    value: &Value,
    style: Style,
    open: &mut Vec<ObjectId>,
) -> fmt::Result {
    match value {
        Value::Undefined => write!(f, "undefined"),
        Value::Null => write!(f, "null"),
        Value::Bool(b) => write!(f, "{}", b),
        Value::Int(n) => write!(f, "{}", n),
        Value::Float(n) => write!(f, "{}", n),
        Value::String(s) => match style {
            Style::Debug => write!(f, "{:?}", s.as_ref()),
            Style::Display => write!(f, "{}", s.as_ref()),
        },
        Value::List(items) => {
            write!(f, "[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_value(f, item, style, open)?;
            }
            write!(f, "]")
        }
        Value::Object(obj) => write_object(f, obj, style, open),
    }
}

fn write_object(
    f: &mut fmt::Formatter<'_>,
    obj: &Object,
    style: Style,
    open: &mut Vec<ObjectId>,
) -> fmt::Result {
    if open.contains(&obj.id()) {
        return write!(f, "<cycle #{}>", obj.id());
    }
    let entries = obj.entries();
    if entries.is_empty() {
        return write!(f, "{{}}");
    }

    open.push(obj.id());
    write!(f, "{{ ")?;
    for (i, (key, value)) in entries.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}: ", key)?;
        write_value(f, value, style, open)?;
    }
    open.pop();
    write!(f, " }}")
}

//! Dynamic field values
//!
//! DTO fields, input values, and query criteria all carry
//! [`serde_json::Value`], so a single lookup can mix strings, integers,
//! and UUID-like identifiers without generic plumbing.

use indexmap::IndexMap;

pub use serde_json::Value;

/// Query criteria: entity field name to the value it must equal.
///
/// Insertion order follows the resolved mapping, which keeps logs and
/// generated queries stable.
pub type Criteria = IndexMap<String, Value>;

/// Returns `true` for inputs the existence check does not look at.
///
/// Only `null` and the empty string count as empty; `0`, `false`, and
/// empty collections are real values.
#[must_use]
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Renders a value for interpolation into messages.
#[must_use]
pub fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

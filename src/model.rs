//! Data model passed between navigation, views and URL building.

use indexmap::IndexMap;
use serde_json::Value;

/// Named values handed to a destination. Insertion order is preserved and
/// decides the order of appended query parameters.
pub type Model = IndexMap<String, Value>;

/// String form of a model value as it appears in a URL.
///
/// Strings are inserted verbatim, `null` becomes empty and everything else
/// uses its JSON text.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

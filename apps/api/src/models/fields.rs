//! Lenient readers for semi-structured model output.
//!
//! Models return numbers as strings, strings as numbers, and lists with the
//! odd object mixed in. These helpers read a field in whatever shape it
//! arrived and never fail: absence is `None` or an empty list.

use serde_json::Value;

/// Display value for a field the model did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// Reads a scalar as trimmed text. Numbers and booleans are rendered; empty
/// strings, nulls and placeholders like "N/A" count as absent.
pub fn text(value: &Value, key: &str) -> Option<String> {
    scalar_text(value.get(key)?)
}

pub fn scalar_text(value: &Value) -> Option<String> {
    let rendered = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if rendered.is_empty() || rendered.eq_ignore_ascii_case(NOT_AVAILABLE) {
        None
    } else {
        Some(rendered)
    }
}

/// Like [`text`] but substitutes the "N/A" sentinel.
pub fn text_or_na(value: &Value, key: &str) -> String {
    text(value, key).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Reads a list of strings. A lone string becomes a one-item list;
/// non-scalar items are dropped.
pub fn string_list(value: &Value, key: &str) -> Vec<String> {
    match value.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(other) => scalar_text(other).into_iter().collect(),
        None => Vec::new(),
    }
}

/// Reads a list of objects, skipping anything that is not an object.
pub fn object_list<'a>(value: &'a Value, key: &str) -> Vec<&'a Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter(|v| v.is_object()).collect())
        .unwrap_or_default()
}

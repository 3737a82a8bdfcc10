//! Absent-tolerant access to API response documents.
//!
//! Every field of a response is optional. Accessors return `Option` and the
//! callers skip whatever unit of aggregation the missing field belonged to.

use serde_json::Value;

/// The documents carried by a response body.
///
/// Accepts a bare array, a `{"data": [...]}` envelope, or a single object.
pub(crate) fn documents(body: &Value) -> &[Value] {
    match body {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(items)) => items,
            _ => std::slice::from_ref(body),
        },
        _ => &[],
    }
}

/// `count` of an entry. The API string-encodes it; plain numbers are accepted too.
pub(crate) fn count_of(entry: &Value) -> Option<u64> {
    match entry.get("count")? {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

/// Value of one breakdown dimension, or the empty string when the entry
/// does not carry it.
pub(crate) fn dimension_of(entry: &Value, dimension: &str) -> String {
    match entry.get(dimension) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

pub(crate) fn str_at<'a>(document: &'a Value, pointer: &str) -> Option<&'a str> {
    document.pointer(pointer).and_then(Value::as_str)
}

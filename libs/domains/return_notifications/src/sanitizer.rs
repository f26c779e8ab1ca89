//! Input sanitation for raw event payloads.
//!
//! Every scalar is trimmed, has markup-significant characters escaped and
//! any remaining tag-like markup stripped. Numbers and booleans are
//! sanitized through their string form; the typed view in
//! [`NotificationEvent`](crate::models::NotificationEvent) reinterprets
//! them afterwards.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>?").unwrap());

static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").unwrap());

/// Sanitize every value of a payload object. Keys are preserved as-is.
pub fn sanitize_payload(payload: &Map<String, Value>) -> Map<String, Value> {
    payload
        .iter()
        .map(|(key, value)| (key.clone(), sanitize_value(value)))
        .collect()
}

/// Sanitize one value. Objects and arrays are walked recursively, `null`
/// is left untouched.
pub fn sanitize_value(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::String(s) => Value::String(sanitize_str(s)),
        Value::Number(n) => Value::String(sanitize_str(&n.to_string())),
        Value::Bool(true) => Value::String("1".to_string()),
        Value::Bool(false) => Value::String(String::new()),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_value).collect()),
        Value::Object(map) => Value::Object(sanitize_payload(map)),
    }
}

/// Trim, escape, then strip tags.
pub fn sanitize_str(input: &str) -> String {
    let escaped = escape_markup(input.trim());
    TAG.replace_all(&escaped, "").into_owned()
}

/// Escape `& < > " '`. An ampersand that already starts a character
/// entity is kept, so escaping is idempotent.
pub fn escape_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for (idx, ch) in input.char_indices() {
        match ch {
            '&' if ENTITY.is_match(&input[idx..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

//! Utility functions for wire-value coercion and safe string handling.

use serde_json::Value;

/// Interpret a loosely-typed wire value as a boolean.
///
/// The PHP backend emits flags as `1`/`0`, `"1"`/`"0"`, `"true"`/`"false"`,
/// or real booleans depending on the endpoint, and error fields as strings
/// or objects. Anything that is not plainly empty/zero/false counts as true.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim();
            !(s.is_empty()
                || s == "0"
                || s.eq_ignore_ascii_case("false")
                || s.eq_ignore_ascii_case("null"))
        }
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

/// Find the largest byte index <= `i` that is on a UTF-8 char boundary.
fn floor_char_boundary(s: &str, i: usize) -> usize {
    if i >= s.len() {
        return s.len();
    }
    let mut pos = i;
    // Walk backwards while we're at a continuation byte (0b10xxxxxx)
    while pos > 0 && !s.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Truncate `&str` to at most `max_bytes`, never splitting a UTF-8 codepoint.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        s
    } else {
        &s[..floor_char_boundary(s, max_bytes)]
    }
}

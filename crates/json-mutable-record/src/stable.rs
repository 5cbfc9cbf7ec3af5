//! Deterministic JSON text encoding with sorted object keys.
//!
//! Text-only dialects persist the canonical form so that equal values always
//! produce identical stored text, regardless of the order keys were inserted
//! into the in-memory object.

use serde_json::Value;

/// Serialize `value` to canonical JSON text: object keys lexicographically
/// sorted, no insignificant whitespace.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("\"{}\"", escape(s)),
        Value::Array(arr) => {
            let mut out = String::from('[');
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&stringify(item));
            }
            out.push(']');
            out
        }
        Value::Object(obj) => {
            let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
            keys.sort_unstable();
            let mut out = String::from('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push('"');
                out.push_str(&escape(key));
                out.push_str("\":");
                out.push_str(&stringify(&obj[*key]));
            }
            out.push('}');
            out
        }
    }
}

/// Escape a string for inclusion in JSON text: quotes, backslashes, and the
/// C0 control range.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c < '\u{0020}' => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

//! Utility functions for mkey handling and error reporting

use fortios_core::resource::Value;

/// Render a state value as an mkey (strings as-is, integers in decimal)
pub fn value_to_mkey(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Int(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Render a wire value as an mkey
pub fn json_to_mkey(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse an mkey back into a state value of the mkey attribute's kind
pub fn mkey_to_value(mkey: &str, integer: bool) -> Value {
    match mkey.parse::<i64>() {
        Ok(n) if integer => Value::Int(n),
        _ => Value::String(mkey.to_string()),
    }
}

/// Join a list of errors into one message
pub fn join_errors<E: std::fmt::Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

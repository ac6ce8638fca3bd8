//! Decoding free-text generator output into a grouped constraint set.
//!
//! Generators often wrap the JSON object in prose or fences, and may nest the
//! set under a `constraints` or `refined_constraints` key.

use plancraft_core::GroupedConstraints;
use serde_json::Value;
use tracing::{debug, warn};

/// Keys a generator may wrap the constraint set in, checked in order.
const WRAPPER_KEYS: [&str; 2] = ["refined_constraints", "constraints"];

/// The first balanced `{...}` object in `text`.
///
/// Braces inside string literals (including escaped quotes) are ignored.
/// Returns `None` when there is no opening brace or it is never closed.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Some(&text[start..end]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse `text` as JSON, falling back to the first embedded object.
pub fn parse_payload(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_object() {
            return Some(value);
        }
    }
    let candidate = extract_json(trimmed)?;
    match serde_json::from_str(candidate) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, "Embedded object is not valid JSON");
            None
        }
    }
}

/// Strip one `refined_constraints` / `constraints` wrapper, if present.
pub fn unwrap_constraints(value: Value) -> Value {
    if let Value::Object(mut map) = value {
        for key in WRAPPER_KEYS {
            if map.get(key).is_some_and(Value::is_object) {
                if let Some(inner) = map.remove(key) {
                    return inner;
                }
            }
        }
        return Value::Object(map);
    }
    value
}

/// Full decode: parse, unwrap, gate. `None` means the payload was rejected
/// and the caller should keep its previous set.
pub fn grouped_from_payload(text: &str) -> Option<GroupedConstraints> {
    let Some(value) = parse_payload(text) else {
        warn!("No JSON object found in generator output");
        return None;
    };
    let set = GroupedConstraints::from_value(&unwrap_constraints(value));
    if set.is_none() {
        warn!("Generator output failed the grouped-constraint gate");
    }
    set
}

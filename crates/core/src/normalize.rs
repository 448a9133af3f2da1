//! Flight-code input normalization

use serde_json::Value;

/// Canonicalize a raw flight-code string.
///
/// If the input looks like a JSON object and parses as one, the first value
/// of the mapping (insertion order) replaces the input - a compatibility
/// shim for callers that wrap the code in a structured payload. Parse
/// failures and non-object payloads leave the input unchanged. The result
/// is then stripped of whitespace and double quotes and uppercased.
///
/// Total and idempotent: `normalize_flight_code` never fails, and applying
/// it twice equals applying it once.
pub fn normalize_flight_code(raw: &str) -> String {
    let unwrapped = unwrap_json_payload(raw);
    unwrapped
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '"')
        .collect::<String>()
        .to_uppercase()
}

fn unwrap_json_payload(raw: &str) -> String {
    if !(raw.contains('{') && raw.contains('}')) {
        return raw.to_string();
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => match map.into_iter().next() {
            Some((_, Value::String(first))) => first,
            Some((_, first)) => first.to_string(),
            None => raw.to_string(),
        },
        _ => raw.to_string(),
    }
}

//! List-response shape normalization.
//!
//! Listing endpoints are inconsistent about where the list lives. Accepted
//! shapes: a bare array, or an object carrying the array under `data`,
//! `records`, `owners`, `keepers`, `livestocks`, or `record.data`.

use serde_json::Value;

const LIST_KEYS: [&str; 5] = ["data", "records", "owners", "keepers", "livestocks"];

/// Extract the record list from a listing response.
///
/// Returns `None` when no list can be found. A body whose `status` is
/// `"Failed"` or `"error"` is treated as an empty list.
pub fn normalize_records(body: &Value) -> Option<Vec<Value>> {
    if let Some(items) = body.as_array() {
        return Some(items.clone());
    }
    let obj = body.as_object()?;

    if let Some(list) = LIST_KEYS
        .iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_array))
    {
        return Some(list.clone());
    }
    if let Some(list) = obj
        .get("record")
        .and_then(|r| r.get("data"))
        .and_then(Value::as_array)
    {
        return Some(list.clone());
    }

    match obj.get("status").and_then(Value::as_str) {
        Some("Failed") | Some("error") => Some(Vec::new()),
        _ => None,
    }
}

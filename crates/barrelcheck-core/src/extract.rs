//! Field extraction from list responses

use serde_json::Value;

/// Collect the value of `field` from every record that has it.
///
/// Records without the field (and non-object entries) are skipped, so the
/// result is never longer than `records` and keeps their relative order.
pub fn extract_values<'a>(records: &'a [Value], field: &str) -> Vec<&'a Value> {
    records
        .iter()
        .filter_map(|record| record.as_object()?.get(field))
        .collect()
}

/// True if the body is a JSON array containing only objects.
#[must_use]
pub fn is_valid_response(body: &Value) -> bool {
    body.as_array()
        .is_some_and(|items| items.iter().all(Value::is_object))
}

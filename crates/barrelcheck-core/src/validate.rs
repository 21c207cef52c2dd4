//! Predicates over extracted response values
//!
//! All checks are pure. An empty sequence passes every list check.

use serde_json::Value;
use uuid::Uuid;

/// True if every value is a string holding a UUID of exactly `version`.
///
/// A non-string value, a parse failure or a UUID of another version fails
/// the whole list.
pub fn is_valid_uuid_list<'a, I>(values: I, version: usize) -> bool
where
    I: IntoIterator<Item = &'a Value>,
{
    values.into_iter().all(|v| is_uuid(v, version))
}

/// True if `value` is a string holding a UUID of exactly `version`.
#[must_use]
pub fn is_uuid(value: &Value, version: usize) -> bool {
    value
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .is_some_and(|u| u.get_version_num() == version)
}

/// True if every value is a string of at least one character.
pub fn is_expected_string<'a, I>(values: I) -> bool
where
    I: IntoIterator<Item = &'a Value>,
{
    values
        .into_iter()
        .all(|v| v.as_str().is_some_and(|s| !s.is_empty()))
}

/// True if `value` is a JSON floating-point number that is `>= 0`.
///
/// Integers do not qualify: `20` is rejected while `20.0` passes.
#[must_use]
pub fn is_double(value: &Value) -> bool {
    match value {
        Value::Number(n) if n.is_f64() => n.as_f64().is_some_and(|f| f >= 0.0),
        _ => false,
    }
}

/// True if every value satisfies [`is_double`].
pub fn is_expected_double<'a, I>(values: I) -> bool
where
    I: IntoIterator<Item = &'a Value>,
{
    values.into_iter().all(is_double)
}

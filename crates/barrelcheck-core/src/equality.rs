//! Field-by-field comparison of response records

use serde_json::{Map, Number, Value};

/// A JSON object as returned by the service.
pub type Record = Map<String, Value>;

/// Check that `actual` matches `expected` on `fields`.
///
/// When `fields` is `None` every key of `expected` is compared. Stops at the
/// first differing or missing field. Numbers compare by value, so `20` and
/// `20.0` are equal.
///
/// # Errors
///
/// Returns the first [`FieldMismatch`] encountered.
pub fn assert_equal_fields(
    actual: &Record,
    expected: &Record,
    fields: Option<&[&str]>,
) -> Result<(), FieldMismatch> {
    let keys: Vec<&str> = match fields {
        Some(f) => f.to_vec(),
        None => expected.keys().map(String::as_str).collect(),
    };

    for key in keys {
        let want = expected
            .get(key)
            .ok_or_else(|| FieldMismatch::MissingExpected(key.to_string()))?;
        let got = actual
            .get(key)
            .ok_or_else(|| FieldMismatch::Missing(key.to_string()))?;
        if !values_equal(got, want) {
            return Err(FieldMismatch::Differs {
                field: key.to_string(),
                expected: want.clone(),
                actual: got.clone(),
            });
        }
    }
    Ok(())
}

/// True if some element of `records` equals `record` on every field.
#[must_use]
pub fn contains_record(records: &[Value], record: &Record) -> bool {
    records
        .iter()
        .filter_map(Value::as_object)
        .any(|r| records_equal(r, record))
}

/// Structural equality with numbers compared by value.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => records_equal(x, y),
        _ => a == b,
    }
}

fn records_equal(x: &Record, y: &Record) -> bool {
    x.len() == y.len()
        && x
            .iter()
            .all(|(k, v)| y.get(k).is_some_and(|w| values_equal(v, w)))
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a == b;
    }
    matches!((x.as_f64(), y.as_f64()), (Some(a), Some(b)) if a == b)
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldMismatch {
    #[error("Mismatch in '{field}': Expected {expected}, got {actual}")]
    Differs {
        field: String,
        expected: Value,
        actual: Value,
    },
    #[error("Missing field '{0}' in actual record")]
    Missing(String),
    #[error("Missing field '{0}' in expected record")]
    MissingExpected(String),
}

impl FieldMismatch {
    /// Name of the offending field.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Differs { field, .. } => field,
            Self::Missing(f) | Self::MissingExpected(f) => f,
        }
    }
}

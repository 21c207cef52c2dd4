//! JSON Schema validation of response bodies
//!
//! Schemas are compiled once and reused for every response. `format`
//! keywords (e.g. `uuid`) are enforced.

use serde_json::Value;

/// A compiled response schema.
pub struct SchemaValidator {
    name: String,
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl SchemaValidator {
    /// Compile `schema` under a display name used in diagnostics.
    ///
    /// # Errors
    ///
    /// Returns error if `schema` is not a valid JSON Schema.
    pub fn compile(name: impl Into<String>, schema: &Value) -> Result<Self, SchemaError> {
        let name = name.into();
        let validator = jsonschema::options()
            .should_validate_formats(true)
            .build(schema)
            .map_err(|e| SchemaError::Invalid {
                name: name.clone(),
                message: e.to_string(),
            })?;
        Ok(Self { name, validator })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validate `document`, returning the first violation.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Violation`] describing the first failed keyword.
    pub fn validate(&self, document: &Value) -> Result<(), SchemaError> {
        self.validator
            .validate(document)
            .map_err(|e| SchemaError::Violation {
                name: self.name.clone(),
                message: e.to_string(),
            })
    }

    /// Boolean form of [`validate`](Self::validate); logs the violation.
    #[must_use]
    pub fn is_valid(&self, document: &Value) -> bool {
        match self.validate(document) {
            Ok(()) => {
                tracing::debug!(schema = %self.name, "response is valid");
                true
            }
            Err(e) => {
                tracing::warn!(schema = %self.name, "{e}");
                false
            }
        }
    }
}

/// One-shot validation against an uncompiled schema.
///
/// An invalid schema counts as a failed validation.
#[must_use]
pub fn validate_json(document: &Value, schema: &Value, schema_name: &str) -> bool {
    match SchemaValidator::compile(schema_name, schema) {
        Ok(validator) => validator.is_valid(document),
        Err(e) => {
            tracing::warn!("{e}");
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("{name} schema is invalid: {message}")]
    Invalid { name: String, message: String },
    #[error("{name} response validation failed: {message}")]
    Violation { name: String, message: String },
}

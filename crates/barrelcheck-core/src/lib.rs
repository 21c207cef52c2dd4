//! barrelcheck-core: validators, configuration and report types
//!
//! Everything here is free of network I/O. The runner crate feeds response
//! bodies into these checks.

pub mod config;
pub mod equality;
pub mod extract;
pub mod fixtures;
pub mod report;
pub mod schema;
pub mod validate;

pub use config::{ConfigError, EndpointsConfig, ResolvedEndpoint};
pub use equality::{FieldMismatch, Record, assert_equal_fields, contains_record};
pub use extract::{extract_values, is_valid_response};
pub use report::{CaseOutcome, CaseStatus, SuiteReport, Verdict, VerdictStatus};
pub use schema::{SchemaError, SchemaValidator, validate_json};
pub use validate::{is_double, is_expected_double, is_expected_string, is_uuid, is_valid_uuid_list};

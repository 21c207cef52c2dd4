//! Contract suite for the barrels and measurements API
//!
//! Cases run one after another in declaration order. A case aborts at its
//! first failed assertion and the next case starts from a clean slate.
//!
//! Some cases need a barrel (or a measurement) that exists on the server.
//! Those resources are created by explicit setup functions and handed to the
//! dependent cases as arguments; the barrel is deleted by an explicit
//! teardown at the end. The cases share server-side state, so two suite runs
//! against the same backend at once can interfere with each other.

pub mod barrels;
pub mod measurements;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use barrelcheck_core::fixtures::{self, NewBarrel, NewMeasurement};
use barrelcheck_core::{
    CaseOutcome, CaseStatus, FieldMismatch, Record, ResolvedEndpoint, SchemaError,
    SchemaValidator, SuiteReport,
};
use serde_json::{Value, json};

use crate::dispatch::{ApiResponse, DispatchError, Dispatcher, Exchange};
use crate::endpoints::ApiUrls;

/// Result of a single case.
pub type CaseResult = Result<(), CaseFailure>;

/// Why a case stopped.
#[derive(Debug, thiserror::Error)]
pub enum CaseFailure {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Field(#[from] FieldMismatch),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("{0}")]
    Assertion(String),
}

/// Fail the case with `message` unless `condition` holds.
///
/// # Errors
///
/// Returns [`CaseFailure::Assertion`] when `condition` is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> CaseResult {
    if condition {
        Ok(())
    } else {
        Err(CaseFailure::Assertion(message.into()))
    }
}

/// Resource group a case belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Barrels,
    Measurements,
}

impl Group {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Barrels => "barrels",
            Self::Measurements => "measurements",
        }
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared, read-only state for every case of one run.
#[derive(Debug)]
pub struct SuiteContext {
    pub dispatcher: Dispatcher,
    pub urls: ApiUrls,
    pub headers: HashMap<String, String>,
    pub invalid_headers: HashMap<String, String>,
    pub barrel_schema: SchemaValidator,
    pub measurement_schema: SchemaValidator,
    pub response_time_limit: Duration,
}

impl SuiteContext {
    /// Build the context for `endpoint`, compiling the response schemas.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built or a schema does
    /// not compile.
    pub fn new(endpoint: &ResolvedEndpoint) -> Result<Self, SuiteError> {
        Ok(Self {
            dispatcher: Dispatcher::new()?,
            urls: ApiUrls::new(&endpoint.base_url),
            headers: fixtures::default_headers(),
            invalid_headers: fixtures::invalid_headers(),
            barrel_schema: SchemaValidator::compile("Barrel", &fixtures::barrel_schema())?,
            measurement_schema: SchemaValidator::compile(
                "Measurement",
                &fixtures::measurement_schema(),
            )?,
            response_time_limit: endpoint.response_time_limit,
        })
    }

    /// Send through the dispatcher.
    ///
    /// # Errors
    ///
    /// Propagates the dispatcher's status mismatch or transport error.
    pub fn send(&self, exchange: Exchange<'_>) -> Result<ApiResponse, CaseFailure> {
        Ok(self.dispatcher.send(&exchange)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SuiteError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// A barrel created by [`barrels::create_barrel`].
#[derive(Debug, Clone)]
pub struct CreatedBarrel {
    pub payload: NewBarrel,
    /// `id`, `qr`, `rfid`, `nfc` as returned by the service
    pub record: Record,
}

impl CreatedBarrel {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.payload.id
    }
}

/// A measurement created by [`measurements::create_measurement`].
#[derive(Debug, Clone)]
pub struct CreatedMeasurement {
    pub payload: NewMeasurement,
    pub record: Record,
}

impl CreatedMeasurement {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.payload.id
    }
}

/// How a case gets its inputs.
#[derive(Clone, Copy)]
pub enum CaseKind {
    Standalone(fn(&SuiteContext) -> CaseResult),
    WithBarrel(fn(&SuiteContext, &CreatedBarrel) -> CaseResult),
    WithMeasurement(fn(&SuiteContext, &CreatedMeasurement) -> CaseResult),
}

/// A named case.
#[derive(Clone, Copy)]
pub struct Case {
    pub name: &'static str,
    pub group: Group,
    pub kind: CaseKind,
}

/// Setup and teardown steps, reported like cases.
pub const BARREL_SETUP: &str = "post_barrel_valid";
pub const MEASUREMENT_SETUP: &str = "post_measurement";
pub const BARREL_TEARDOWN: &str = "delete_barrel";

/// Every case in declaration order.
#[must_use]
pub fn cases() -> Vec<Case> {
    let mut all = barrels::cases();
    all.extend(measurements::cases());
    all
}

/// Case names with their group and role, in the order a full run uses.
#[must_use]
pub fn catalog() -> Vec<(&'static str, Group, &'static str)> {
    let mut out = Vec::new();
    let all = cases();
    for c in all.iter().filter(|c| matches!(c.kind, CaseKind::Standalone(_))) {
        out.push((c.name, c.group, "case"));
    }
    out.push((BARREL_SETUP, Group::Barrels, "setup"));
    for c in all.iter().filter(|c| matches!(c.kind, CaseKind::WithBarrel(_))) {
        out.push((c.name, c.group, "case"));
    }
    out.push((MEASUREMENT_SETUP, Group::Measurements, "setup"));
    for c in all
        .iter()
        .filter(|c| matches!(c.kind, CaseKind::WithMeasurement(_)))
    {
        out.push((c.name, c.group, "case"));
    }
    out.push((BARREL_TEARDOWN, Group::Barrels, "teardown"));
    out
}

/// Which cases to run.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Substring the case name must contain
    pub filter: Option<String>,
    pub group: Option<Group>,
}

impl Selection {
    #[must_use]
    pub fn matches(&self, name: &str, group: Group) -> bool {
        self.group.is_none_or(|g| g == group)
            && self.filter.as_deref().is_none_or(|f| name.contains(f))
    }
}

/// Run the selected cases and collect their outcomes.
pub fn run(ctx: &SuiteContext, selection: &Selection, report: &mut SuiteReport) {
    let all = cases();
    let picked: Vec<&Case> = all
        .iter()
        .filter(|c| selection.matches(c.name, c.group))
        .collect();

    for case in &picked {
        if let CaseKind::Standalone(f) = case.kind {
            record(report, case.name, case.group, || f(ctx));
        }
    }

    let with_barrel: Vec<_> = picked
        .iter()
        .filter_map(|c| match c.kind {
            CaseKind::WithBarrel(f) => Some((c.name, c.group, f)),
            _ => None,
        })
        .collect();
    let with_measurement: Vec<_> = picked
        .iter()
        .filter_map(|c| match c.kind {
            CaseKind::WithMeasurement(f) => Some((c.name, c.group, f)),
            _ => None,
        })
        .collect();

    let want_measurement = !with_measurement.is_empty()
        || selection.matches(MEASUREMENT_SETUP, Group::Measurements);
    let want_barrel = !with_barrel.is_empty()
        || want_measurement
        || selection.matches(BARREL_SETUP, Group::Barrels)
        || selection.matches(BARREL_TEARDOWN, Group::Barrels);
    if !want_barrel {
        return;
    }

    let Some(barrel) = record_setup(report, BARREL_SETUP, Group::Barrels, || {
        barrels::create_barrel(ctx)
    }) else {
        let reason = format!("fixture '{BARREL_SETUP}' failed");
        for (name, group, _) in &with_barrel {
            skip(report, name, *group, &reason);
        }
        if want_measurement {
            skip(report, MEASUREMENT_SETUP, Group::Measurements, &reason);
        }
        for (name, group, _) in &with_measurement {
            skip(report, name, *group, &reason);
        }
        skip(report, BARREL_TEARDOWN, Group::Barrels, &reason);
        return;
    };

    for (name, group, f) in &with_barrel {
        record(report, name, *group, || f(ctx, &barrel));
    }

    if want_measurement {
        let created = record_setup(report, MEASUREMENT_SETUP, Group::Measurements, || {
            measurements::create_measurement(ctx, &barrel)
        });
        match created {
            Some(measurement) => {
                for (name, group, f) in &with_measurement {
                    record(report, name, *group, || f(ctx, &measurement));
                }
            }
            None => {
                let reason = format!("fixture '{MEASUREMENT_SETUP}' failed");
                for (name, group, _) in &with_measurement {
                    skip(report, name, *group, &reason);
                }
            }
        }
    }

    record(report, BARREL_TEARDOWN, Group::Barrels, || {
        barrels::delete_barrel(ctx, &barrel)
    });
}

fn record(report: &mut SuiteReport, name: &str, group: Group, f: impl FnOnce() -> CaseResult) {
    record_setup(report, name, group, f);
}

fn record_setup<T>(
    report: &mut SuiteReport,
    name: &str,
    group: Group,
    f: impl FnOnce() -> Result<T, CaseFailure>,
) -> Option<T> {
    let start = Instant::now();
    let result = f();
    let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    let (status, message, value) = match result {
        Ok(v) => (CaseStatus::Pass, None, Some(v)),
        Err(e) => (CaseStatus::Fail, Some(e.to_string()), None),
    };
    match &message {
        None => tracing::info!(case = name, %group, elapsed_ms, "pass"),
        Some(m) => tracing::info!(case = name, %group, elapsed_ms, "fail: {m}"),
    }

    report.push(CaseOutcome {
        name: name.to_string(),
        group: group.to_string(),
        status,
        message,
        elapsed_ms,
    });
    value
}

fn skip(report: &mut SuiteReport, name: &str, group: Group, reason: &str) {
    tracing::info!(case = name, %group, "skip: {reason}");
    report.push(CaseOutcome {
        name: name.to_string(),
        group: group.to_string(),
        status: CaseStatus::Skip,
        message: Some(reason.to_string()),
        elapsed_ms: 0,
    });
}

// ── Assertion helpers shared by the case modules ──

/// The body as a list of records.
pub(crate) fn as_list(body: &Value) -> Result<&[Value], CaseFailure> {
    body.as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| CaseFailure::Assertion(format!("expected a JSON array, got {body}")))
}

/// The body as a single record.
pub(crate) fn as_record(body: &Value) -> Result<&Record, CaseFailure> {
    body.as_object()
        .ok_or_else(|| CaseFailure::Assertion(format!("expected a JSON object, got {body}")))
}

/// Check that `errors[field]` is exactly `[message]`.
pub(crate) fn expect_error_message(body: &Value, field: &str, message: &str) -> CaseResult {
    let actual = body.get("errors").and_then(|e| e.get(field));
    let expected = json!([message]);
    ensure(
        actual == Some(&expected),
        format!(
            "invalid validation message for '{field}': expected {expected}, got {}",
            actual.map_or_else(|| "<absent>".to_string(), Value::to_string)
        ),
    )
}

/// Check that the body's `title` equals `title`.
pub(crate) fn expect_title(body: &Value, title: &str) -> CaseResult {
    let actual = body.get("title").and_then(Value::as_str);
    ensure(
        actual == Some(title),
        format!("expected title {title:?}, got {actual:?}"),
    )
}

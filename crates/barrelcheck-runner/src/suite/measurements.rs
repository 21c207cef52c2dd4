//! Measurement resource cases

use barrelcheck_core::fixtures::{
    NewBarrel, NewMeasurement, UNSUPPORTED_MEDIA_TYPE_TITLE, VALIDATION_TITLE,
    invalid_measurement, messages,
};
use barrelcheck_core::{assert_equal_fields, is_double};
use serde_json::Value;

use super::{
    Case, CaseFailure, CaseKind, CaseResult, CreatedBarrel, CreatedMeasurement, Group,
    SuiteContext, as_record, ensure, expect_error_message, expect_title,
};
use crate::dispatch::Exchange;

const MEASUREMENT_FIELDS: [&str; 4] = ["id", "barrelId", "dirtLevel", "weight"];

pub(super) fn cases() -> Vec<Case> {
    let case = |name, kind| Case {
        name,
        group: Group::Measurements,
        kind,
    };
    vec![
        case(
            "post_measurement_missing_req_value",
            CaseKind::Standalone(post_measurement_missing_req_value),
        ),
        case(
            "post_measurement_invalid_type",
            CaseKind::Standalone(post_measurement_invalid_type),
        ),
        case(
            "post_measurement_validation_msgs",
            CaseKind::Standalone(post_measurement_validation_msgs),
        ),
        case(
            "post_measurement_invalid_barrel_id",
            CaseKind::Standalone(post_measurement_invalid_barrel_id),
        ),
        case(
            "post_measurement_invalid_double",
            CaseKind::Standalone(post_measurement_invalid_double),
        ),
        case(
            "post_invalid_header_measurement",
            CaseKind::Standalone(post_invalid_header_measurement),
        ),
        case("get_measurements", CaseKind::Standalone(get_measurements)),
        case(
            "get_measurement_with_exist_id",
            CaseKind::WithMeasurement(get_measurement_with_exist_id),
        ),
    ]
}

/// Setup: record a measurement against `barrel`.
///
/// # Errors
///
/// Fails if creation, the schema, the echoed fields or the double checks do
/// not hold.
pub fn create_measurement(
    ctx: &SuiteContext,
    barrel: &CreatedBarrel,
) -> Result<CreatedMeasurement, CaseFailure> {
    let url = ctx.urls.measurements();
    let payload = NewMeasurement::valid(barrel.id());
    let request = Value::Object(payload.to_record());

    let data = ctx
        .send(Exchange::post(&url).headers(&ctx.headers).json(&request))?
        .json()?;

    ctx.measurement_schema.validate(&data)?;
    let received = as_record(&data)?;
    assert_equal_fields(received, &payload.to_record(), Some(&MEASUREMENT_FIELDS))?;
    for field in ["dirtLevel", "weight"] {
        ensure(
            received.get(field).is_some_and(is_double),
            format!("{field} is not a non-negative double"),
        )?;
    }

    Ok(CreatedMeasurement {
        payload,
        record: received.clone(),
    })
}

fn get_measurement_with_exist_id(
    ctx: &SuiteContext,
    measurement: &CreatedMeasurement,
) -> CaseResult {
    let url = ctx.urls.measurement(measurement.id());
    let data = ctx.send(Exchange::get(&url).headers(&ctx.headers))?.json()?;
    assert_equal_fields(
        as_record(&data)?,
        &measurement.record,
        Some(&MEASUREMENT_FIELDS),
    )?;
    Ok(())
}

fn post_rejected(ctx: &SuiteContext, body: &Value) -> Result<Value, CaseFailure> {
    let url = ctx.urls.measurements();
    let resp = ctx.send(
        Exchange::post(&url)
            .headers(&ctx.headers)
            .json(body)
            .expect(400),
    )?;
    Ok(resp.json()?)
}

/// A barrel id that the server has never seen.
fn unknown_barrel_id() -> String {
    NewBarrel::valid().id
}

fn post_measurement_missing_req_value(ctx: &SuiteContext) -> CaseResult {
    let data = post_rejected(ctx, &invalid_measurement::missing_attr(&unknown_barrel_id()))?;
    expect_error_message(&data, "weight", messages::WEIGHT_REQUIRED)
}

fn post_measurement_invalid_type(ctx: &SuiteContext) -> CaseResult {
    post_rejected(ctx, &invalid_measurement::invalid_type(&unknown_barrel_id()))?;
    Ok(())
}

fn post_measurement_validation_msgs(ctx: &SuiteContext) -> CaseResult {
    let data = post_rejected(ctx, &invalid_measurement::validation_msgs())?;
    ensure(
        data.get("errors").is_some(),
        "Response does not contain 'errors' key",
    )?;
    expect_title(&data, VALIDATION_TITLE)?;
    expect_error_message(&data, "barrelId", messages::BARREL_ID_REQUIRED)?;
    expect_error_message(&data, "dirtLevel", messages::DIRT_LEVEL_REQUIRED)?;
    expect_error_message(&data, "weight", messages::WEIGHT_REQUIRED)
}

fn post_measurement_invalid_barrel_id(ctx: &SuiteContext) -> CaseResult {
    let data = post_rejected(ctx, &invalid_measurement::invalid_barrel_id())?;
    expect_error_message(&data, "$.barrelId", messages::INVALID_UUID)
}

/// Negative readings are rejected and not echoed back as valid doubles.
fn post_measurement_invalid_double(ctx: &SuiteContext) -> CaseResult {
    let data = post_rejected(ctx, &invalid_measurement::negative_double(&unknown_barrel_id()))?;
    for field in ["weight", "dirtLevel"] {
        ensure(
            !data.get(field).is_some_and(is_double),
            format!("rejected response carries a valid {field}"),
        )?;
    }
    Ok(())
}

fn post_invalid_header_measurement(ctx: &SuiteContext) -> CaseResult {
    let url = ctx.urls.measurements();
    let data = ctx
        .send(
            Exchange::post(&url)
                .headers(&ctx.invalid_headers)
                .expect(415),
        )?
        .json()?;
    expect_title(&data, UNSUPPORTED_MEDIA_TYPE_TITLE)
}

fn get_measurements(ctx: &SuiteContext) -> CaseResult {
    let url = ctx.urls.measurements();
    let data = ctx.send(Exchange::get(&url).headers(&ctx.headers))?.json()?;
    let empty = match &data {
        Value::Null => true,
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    };
    ensure(empty, format!("JSON response is not empty: {data}"))
}

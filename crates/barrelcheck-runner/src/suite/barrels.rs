//! Barrel resource cases

use barrelcheck_core::fixtures::{JSON_CONTENT_TYPE, NewBarrel, invalid_barrel, messages};
use barrelcheck_core::{
    Record, assert_equal_fields, contains_record, extract_values, is_expected_string,
    is_valid_uuid_list,
};
use serde_json::Value;

use super::{
    Case, CaseFailure, CaseKind, CaseResult, CreatedBarrel, Group, SuiteContext, as_list,
    as_record, ensure, expect_error_message,
};
use crate::dispatch::Exchange;

const BARREL_FIELDS: [&str; 4] = ["id", "qr", "rfid", "nfc"];

pub(super) fn cases() -> Vec<Case> {
    let case = |name, kind| Case {
        name,
        group: Group::Barrels,
        kind,
    };
    vec![
        case("get_barrels", CaseKind::Standalone(get_barrels)),
        case(
            "post_barrel_invalid_headers",
            CaseKind::Standalone(post_barrel_invalid_headers),
        ),
        case(
            "delete_barrel_invalid_id",
            CaseKind::Standalone(delete_barrel_invalid_id),
        ),
        case(
            "post_barrel_missing_req_value",
            CaseKind::Standalone(post_barrel_missing_req_value),
        ),
        case(
            "post_barrel_boundary_values",
            CaseKind::Standalone(post_barrel_boundary_values),
        ),
        case(
            "post_barrel_invalid_uuid",
            CaseKind::Standalone(post_barrel_invalid_uuid),
        ),
        case(
            "post_barrel_empty_body",
            CaseKind::Standalone(post_barrel_empty_body),
        ),
        case(
            "post_barrel_invalid_param_type",
            CaseKind::Standalone(post_barrel_invalid_param_type),
        ),
        case(
            "response_time_get_barrels",
            CaseKind::Standalone(response_time_get_barrels),
        ),
        case(
            "create_twice_the_same_barrel",
            CaseKind::WithBarrel(create_twice_the_same_barrel),
        ),
        case(
            "delete_barrel_inv_header",
            CaseKind::WithBarrel(delete_barrel_inv_header),
        ),
    ]
}

/// Every listed barrel has a v4 id and non-empty qr/rfid/nfc.
pub fn get_barrels(ctx: &SuiteContext) -> CaseResult {
    let url = ctx.urls.barrels();
    let body = ctx.send(Exchange::get(&url).headers(&ctx.headers))?.json()?;
    let records = as_list(&body)?;

    ensure(
        is_valid_uuid_list(extract_values(records, "id"), 4),
        "id is not a valid v4 UUID string",
    )?;
    for field in ["qr", "rfid", "nfc"] {
        ensure(
            is_expected_string(extract_values(records, field)),
            format!("{field} is not a String or it's an empty String"),
        )?;
    }
    Ok(())
}

/// Setup: create a barrel, check the response, and find it in the list.
///
/// # Errors
///
/// Fails if creation, the schema, the content type, the echoed fields or
/// the follow-up listing do not match.
pub fn create_barrel(ctx: &SuiteContext) -> Result<CreatedBarrel, CaseFailure> {
    let url = ctx.urls.barrels();
    let payload = NewBarrel::valid();
    let request = Value::Object(payload.to_record());

    let resp = ctx.send(
        Exchange::post(&url)
            .headers(&ctx.headers)
            .json(&request)
            .expect(201),
    )?;
    let data = resp.json()?;

    ctx.barrel_schema.validate(&data)?;
    let content_type = resp.content_type();
    ensure(
        content_type == Some(JSON_CONTENT_TYPE),
        format!("Expected {JSON_CONTENT_TYPE} but got {content_type:?}"),
    )?;

    let received = as_record(&data)?;
    assert_equal_fields(received, &payload.to_record(), Some(&BARREL_FIELDS))?;

    let record: Record = BARREL_FIELDS
        .iter()
        .filter_map(|k| received.get(*k).map(|v| ((*k).to_string(), v.clone())))
        .collect();

    let listed = ctx.send(Exchange::get(&url).headers(&ctx.headers))?.json()?;
    ensure(
        contains_record(as_list(&listed)?, &record),
        format!("created barrel {} is not in the barrel list", payload.id),
    )?;

    Ok(CreatedBarrel { payload, record })
}

/// Teardown: delete the barrel, then confirm it is gone.
///
/// # Errors
///
/// Fails unless the delete returns 200 and a later lookup returns 404.
pub fn delete_barrel(ctx: &SuiteContext, barrel: &CreatedBarrel) -> CaseResult {
    let url = ctx.urls.barrel(barrel.id());
    ctx.send(Exchange::delete(&url).headers(&ctx.headers))?;
    ctx.send(Exchange::get(&url).headers(&ctx.headers).expect(404))?;
    Ok(())
}

fn create_twice_the_same_barrel(ctx: &SuiteContext, barrel: &CreatedBarrel) -> CaseResult {
    let url = ctx.urls.barrels();
    let body = Value::Object(barrel.record.clone());
    ctx.send(
        Exchange::post(&url)
            .headers(&ctx.headers)
            .json(&body)
            .expect(409),
    )?;
    Ok(())
}

fn delete_barrel_inv_header(ctx: &SuiteContext, barrel: &CreatedBarrel) -> CaseResult {
    let url = ctx.urls.barrel(barrel.id());
    ctx.send(
        Exchange::delete(&url)
            .headers(&ctx.invalid_headers)
            .expect(400),
    )?;
    Ok(())
}

fn post_barrel_invalid_headers(ctx: &SuiteContext) -> CaseResult {
    let url = ctx.urls.barrels();
    let body = Value::Object(NewBarrel::valid().to_record());
    ctx.send(
        Exchange::post(&url)
            .headers(&ctx.invalid_headers)
            .json(&body)
            .expect(400),
    )?;
    Ok(())
}

fn delete_barrel_invalid_id(ctx: &SuiteContext) -> CaseResult {
    let url = ctx.urls.barrel("a");
    ctx.send(Exchange::delete(&url).headers(&ctx.headers).expect(400))?;
    Ok(())
}

fn post_rejected(ctx: &SuiteContext, body: &Value) -> Result<Value, CaseFailure> {
    let url = ctx.urls.barrels();
    let resp = ctx.send(
        Exchange::post(&url)
            .headers(&ctx.headers)
            .json(body)
            .expect(400),
    )?;
    Ok(resp.json()?)
}

fn post_barrel_missing_req_value(ctx: &SuiteContext) -> CaseResult {
    post_rejected(ctx, &invalid_barrel::missing_values())?;
    Ok(())
}

fn post_barrel_boundary_values(ctx: &SuiteContext) -> CaseResult {
    post_rejected(ctx, &invalid_barrel::boundary_values())?;
    Ok(())
}

fn post_barrel_invalid_uuid(ctx: &SuiteContext) -> CaseResult {
    let data = post_rejected(ctx, &invalid_barrel::wrong_uuid())?;
    expect_error_message(&data, "$.id", messages::INVALID_UUID)
}

/// An empty body is rejected with exactly the three required-field errors.
fn post_barrel_empty_body(ctx: &SuiteContext) -> CaseResult {
    let data = post_rejected(ctx, &invalid_barrel::empty())?;
    expect_error_message(&data, "qr", messages::QR_REQUIRED)?;
    expect_error_message(&data, "rfid", messages::RFID_REQUIRED)?;
    expect_error_message(&data, "nfc", messages::NFC_REQUIRED)?;

    let mut named: Vec<&str> = data
        .get("errors")
        .and_then(Value::as_object)
        .map(|e| e.keys().map(String::as_str).collect())
        .unwrap_or_default();
    named.sort_unstable();
    ensure(
        named == ["nfc", "qr", "rfid"],
        format!("expected errors for nfc, qr, rfid only, got {named:?}"),
    )
}

fn post_barrel_invalid_param_type(ctx: &SuiteContext) -> CaseResult {
    let data = post_rejected(ctx, &invalid_barrel::invalid_type())?;
    expect_error_message(&data, "rfid", messages::RFID_NOT_STRING)
}

fn response_time_get_barrels(ctx: &SuiteContext) -> CaseResult {
    let url = ctx.urls.barrels();
    let resp = ctx.send(Exchange::get(&url).headers(&ctx.headers))?;
    ensure(
        resp.elapsed < ctx.response_time_limit,
        format!(
            "API response is too slow: {:.2} s (limit {:.2} s)",
            resp.elapsed.as_secs_f64(),
            ctx.response_time_limit.as_secs_f64()
        ),
    )
}

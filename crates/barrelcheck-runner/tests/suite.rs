//! Suite runs against the emulated barrels and measurements service

mod common;

use barrelcheck_core::{CaseStatus, VerdictStatus};
use barrelcheck_runner::suite::{self, BARREL_SETUP, BARREL_TEARDOWN, MEASUREMENT_SETUP};
use barrelcheck_runner::{
    CaseFailure, DispatchError, Dispatcher, Exchange, Group, Selection, SuiteContext, run_suite,
};
use common::{FakeService, StubResponse, StubServer};

#[test]
fn full_suite_passes_against_conforming_service() {
    let (server, state) = FakeService::start();

    let report = run_suite(&server.endpoint(), &Selection::default()).unwrap();

    let failures: Vec<_> = report
        .outcomes
        .iter()
        .filter(|o| o.status != CaseStatus::Pass)
        .map(|o| format!("{}: {:?}", o.name, o.message))
        .collect();
    assert!(failures.is_empty(), "failures: {failures:#?}");
    assert_eq!(report.verdict().status, VerdictStatus::Pass);
    assert_eq!(report.outcomes.len(), suite::catalog().len());
    assert_eq!(
        report.outcomes.last().map(|o| o.name.as_str()),
        Some(BARREL_TEARDOWN)
    );
    assert_eq!(state.lock().unwrap().barrel_count(), 0);
}

#[test]
fn outcomes_follow_catalog_order() {
    let (server, _state) = FakeService::start();

    let report = run_suite(&server.endpoint(), &Selection::default()).unwrap();

    let ran: Vec<&str> = report.outcomes.iter().map(|o| o.name.as_str()).collect();
    let planned: Vec<&str> = suite::catalog().iter().map(|(n, _, _)| *n).collect();
    assert_eq!(ran, planned);
}

#[test]
fn create_list_delete_lifecycle() {
    let (server, _state) = FakeService::start();
    let ctx = SuiteContext::new(&server.endpoint()).unwrap();

    let barrel = suite::barrels::create_barrel(&ctx).unwrap();

    let listed = ctx
        .send(Exchange::get(&ctx.urls.barrels()).headers(&ctx.headers))
        .unwrap()
        .json()
        .unwrap();
    let ids: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|b| b["id"].as_str())
        .collect();
    assert!(ids.contains(&barrel.id()));

    suite::barrels::delete_barrel(&ctx, &barrel).unwrap();

    let err = ctx
        .send(Exchange::get(&ctx.urls.barrel(barrel.id())).expect(200))
        .unwrap_err();
    assert!(err.to_string().contains("expected 200 but found 404"));
}

#[test]
fn missing_required_fields_are_named() {
    let (server, _state) = FakeService::start();
    let ctx = SuiteContext::new(&server.endpoint()).unwrap();
    let url = ctx.urls.barrels();
    let body = serde_json::json!({});

    let data = Dispatcher::new()
        .unwrap()
        .send(&Exchange::post(&url).json(&body).expect(400))
        .unwrap()
        .json()
        .unwrap();

    let mut named: Vec<&str> = data["errors"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    named.sort_unstable();
    assert_eq!(named, ["nfc", "qr", "rfid"]);
}

#[test]
fn failed_setup_skips_dependents() {
    let server = StubServer::start(|req| {
        if req.method == "POST" {
            StubResponse::empty(500)
        } else {
            StubResponse::json(200, &serde_json::json!([]))
        }
    });
    let selection = Selection {
        filter: Some("twice".into()),
        group: None,
    };

    let report = run_suite(&server.endpoint(), &selection).unwrap();

    let by_name = |name: &str| {
        report
            .outcomes
            .iter()
            .find(|o| o.name == name)
            .unwrap_or_else(|| panic!("{name} not reported"))
    };
    assert_eq!(by_name(BARREL_SETUP).status, CaseStatus::Fail);
    assert!(
        by_name(BARREL_SETUP)
            .message
            .as_deref()
            .is_some_and(|m| m.contains("expected 201 but found 500"))
    );
    assert_eq!(
        by_name("create_twice_the_same_barrel").status,
        CaseStatus::Skip
    );
    assert_eq!(by_name(BARREL_TEARDOWN).status, CaseStatus::Skip);
    assert_eq!(report.verdict().exit_code, 1);
}

#[test]
fn group_selection_without_dependents_skips_fixtures() {
    let (server, state) = FakeService::start();
    let selection = Selection {
        filter: Some("post_measurement_invalid".into()),
        group: Some(Group::Measurements),
    };

    let report = run_suite(&server.endpoint(), &selection).unwrap();

    assert!(report.outcomes.iter().all(|o| o.status == CaseStatus::Pass));
    assert!(report.outcomes.iter().all(|o| o.group == "measurements"));
    assert!(!report.outcomes.iter().any(|o| o.name == MEASUREMENT_SETUP));
    assert_eq!(state.lock().unwrap().barrel_count(), 0);
}

#[test]
fn wrong_status_in_case_is_reported_as_failure() {
    let server = StubServer::start(|_| StubResponse::empty(404));
    let selection = Selection {
        filter: Some("get_barrels".into()),
        group: Some(Group::Barrels),
    };

    let report = run_suite(&server.endpoint(), &selection).unwrap();

    let outcome = report
        .outcomes
        .iter()
        .find(|o| o.name == "get_barrels")
        .unwrap();
    assert_eq!(outcome.status, CaseStatus::Fail);
    assert!(
        outcome
            .message
            .as_deref()
            .is_some_and(|m| m.ends_with("expected 200 but found 404"))
    );
}

#[test]
fn case_failure_wraps_dispatch_error() {
    let err: CaseFailure = DispatchError::Transport("boom".into()).into();
    assert_eq!(err.to_string(), "HTTP error: boom");
}

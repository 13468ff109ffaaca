// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for an assembled desk talking HTTP to stub services.
//!
//! Each test starts its own mock server standing in for both the monolith
//! and the ticket service. Tests are independent and order-insensitive.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use claimdesk::DeskContext;
use claimdesk_bus::{DeskEvent, Topic};
use claimdesk_core::{
    ClaimContext, Customer, CustomerId, DeskError, Envelope, Phone, RestMethod, TicketItem,
};
use claimdesk_core::types::service;
use claimdesk_reminders::ReminderCount;
use claimdesk_test_utils::{EventRecorder, MockRest};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_toml(server: &MockServer, token: Option<&str>) -> String {
    let token = token
        .map(|t| format!("session_token = \"{t}\"\n"))
        .unwrap_or_default();
    format!(
        r#"
[agent]
id = "agent42"
{token}
[services]
monolith_url = "{uri}/monolith"
tickets_url = "{uri}/tickets"
request_timeout_secs = 5
"#,
        uri = server.uri()
    )
}

fn desk(server: &MockServer, token: Option<&str>) -> DeskContext {
    let config = claimdesk_config::load_and_validate_str(&config_toml(server, token))
        .expect("test config should be valid");
    DeskContext::from_config(config).unwrap()
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": data }))
}

fn fault(code: i64, msg: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "error": { "code": code, "msg": msg } }))
}

async fn mount_catalogs(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/tickets/subtypes"))
        .respond_with(ok(json!([
            {"id": 1, "name": "Recurring Purchase Canceled"},
            {"id": 6, "name": "General Inquiry"}
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tickets/action_types"))
        .respond_with(ok(json!([{"id": 10, "name": "Escalation"}])))
        .mount(server)
        .await;
}

async fn mount_count(server: &MockServer, count: u64) {
    Mock::given(method("GET"))
        .and(path("/monolith/reminder_count"))
        .and(query_param("resolved", "false"))
        .respond_with(ok(json!({ "count": count })))
        .mount(server)
        .await;
}

async fn wait_for_count(desk: &DeskContext, expected: ReminderCount) {
    for _ in 0..200 {
        if desk.reminders().count() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "reminder count stayed {:?}, expected {expected:?}",
        desk.reminders().count()
    );
}

fn customer() -> Customer {
    Customer::new(Phone::parse("555-123-4567").unwrap())
        .with_id(CustomerId("cust-9".into()))
        .with_name("Ada Lovelace")
}

// ---- Claiming ----

#[tokio::test]
async fn open_ticket_then_claim_over_http() {
    let server = MockServer::start().await;
    mount_catalogs(&server).await;
    mount_count(&server, 0).await;
    Mock::given(method("POST"))
        .and(path("/tickets/ticket"))
        .and(header("authorization", "Bearer tok-1"))
        .and(body_partial_json(json!({ "phone": "+15551234567", "subTypeId": 6 })))
        .respond_with(ok(json!({ "id": "T1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/monolith/claim"))
        .and(body_partial_json(json!({
            "phone": "+15551234567",
            "ticketId": "T1",
            "customerId": "cust-9",
            "continuous": false
        })))
        .respond_with(ok(json!({ "id": "C1", "claimedBy": "agent42" })))
        .expect(1)
        .mount(&server)
        .await;

    let desk = desk(&server, Some("tok-1"));
    let recorder = EventRecorder::attach(desk.bus());
    desk.start();

    let claim = desk
        .claims()
        .create_ticket_then_claim(
            customer(),
            "General Inquiry",
            &[TicketItem::note("called about refill")],
            ClaimContext::regular(),
        )
        .await
        .unwrap();

    assert_eq!(claim.id.as_str(), "C1");
    assert_eq!(claim.ticket_id.as_ref().map(|t| t.as_str()), Some("T1"));
    assert_eq!(claim.claimed_by.as_str(), "agent42");
    assert_eq!(recorder.count(&Topic::CLAIMED_ADD), 1);
    assert!(recorder.errors().is_empty());
    desk.shutdown();
}

#[tokio::test]
async fn duplicate_claim_deletes_the_new_ticket() {
    let server = MockServer::start().await;
    mount_catalogs(&server).await;
    mount_count(&server, 0).await;
    Mock::given(method("POST"))
        .and(path("/tickets/ticket"))
        .respond_with(ok(json!({ "id": "T2" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/monolith/claim"))
        .respond_with(fault(1101, "already claimed"))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/tickets/ticket"))
        .and(body_json(json!({ "ticketId": "T2" })))
        .respond_with(ok(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    let desk = desk(&server, None);
    let recorder = EventRecorder::attach(desk.bus());
    desk.start();

    let err = desk
        .claims()
        .create_ticket_then_claim(customer(), "General Inquiry", &[], ClaimContext::regular())
        .await
        .unwrap_err();

    assert!(matches!(err, DeskError::DuplicateClaim));
    assert_eq!(recorder.errors(), vec!["Customer has already been claimed"]);
    assert_eq!(recorder.count(&Topic::CLAIMED_ADD), 0);
}

#[tokio::test]
async fn unknown_subtype_never_reaches_the_ticket_service() {
    let server = MockServer::start().await;
    mount_catalogs(&server).await;
    Mock::given(method("POST"))
        .and(path("/tickets/ticket"))
        .respond_with(ok(json!({ "id": "T3" })))
        .expect(0)
        .mount(&server)
        .await;

    let desk = desk(&server, None);
    let err = desk
        .claims()
        .create_ticket_then_claim(customer(), "Lost Package", &[], ClaimContext::regular())
        .await
        .unwrap_err();

    assert!(matches!(err, DeskError::Validation(_)));
}

// ---- Resolution ----

#[tokio::test]
async fn resolve_and_release_over_http() {
    let server = MockServer::start().await;
    mount_catalogs(&server).await;
    Mock::given(method("PUT"))
        .and(path("/tickets/resolve"))
        .and(body_json(json!({ "ticketId": "T4", "subTypeId": 1 })))
        .respond_with(ok(json!(null)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/monolith/claim"))
        .and(body_json(json!({ "phone": "+15551234567" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let desk = desk(&server, None);
    let recorder = EventRecorder::attach(desk.bus());
    let ticket = claimdesk_core::TicketId("T4".into());

    desk.claims()
        .resolve_and_release(
            &customer().phone,
            Some(&ticket),
            "Recurring Purchase Canceled",
        )
        .await
        .unwrap();

    assert_eq!(recorder.topics(), vec![Topic::CLAIMED_REMOVE]);
}

#[tokio::test]
async fn envelope_warnings_reach_the_bus() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/monolith/claim"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {},
            "warning": "Customer has an unpaid balance"
        })))
        .mount(&server)
        .await;

    let desk = desk(&server, None);
    let recorder = EventRecorder::attach(desk.bus());

    desk.claims()
        .transfer(
            &customer().phone,
            &"agent7".into(),
            Topic::custom("transferredRemove"),
        )
        .await
        .unwrap();

    assert_eq!(recorder.warnings(), vec!["Customer has an unpaid balance"]);
    assert_eq!(recorder.count(&Topic::custom("transferredRemove")), 1);
}

// ---- Session and reminders ----

#[tokio::test]
async fn sign_in_fetches_the_reminder_count() {
    let server = MockServer::start().await;
    mount_count(&server, 3).await;

    let desk = desk(&server, Some("tok-2"));
    desk.start();

    wait_for_count(&desk, ReminderCount::Known(3)).await;
    assert!(desk.http().unwrap().session().is_active());
}

#[tokio::test]
async fn expired_session_signs_out_and_zeroes_reminders() {
    let server = MockServer::start().await;
    mount_count(&server, 3).await;
    Mock::given(method("DELETE"))
        .and(path("/monolith/claim"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let desk = desk(&server, Some("tok-3"));
    let recorder = EventRecorder::attach(desk.bus());
    desk.start();
    wait_for_count(&desk, ReminderCount::Known(3)).await;

    let err = desk.claims().release(&customer().phone).await.unwrap_err();

    assert!(matches!(err, DeskError::SessionExpired));
    assert!(!desk.http().unwrap().session().is_active());
    assert_eq!(desk.reminders().count(), ReminderCount::Known(0));
    assert_eq!(recorder.count(&Topic::SIGNED_OUT), 1);
    assert!(
        recorder
            .events()
            .contains(&DeskEvent::claimed_remove(customer().phone))
    );
}

#[tokio::test]
async fn adding_a_reminder_refreshes_the_count() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/monolith/reminder"))
        .and(body_partial_json(json!({
            "customerPhone": "+15551234567",
            "note": "call back"
        })))
        .respond_with(ok(json!({ "id": "R1" })))
        .expect(1)
        .mount(&server)
        .await;
    mount_count(&server, 1).await;

    let desk = desk(&server, None);
    let due = chrono::Utc::now() + chrono::Duration::hours(2);
    let saved = desk
        .reminders()
        .add(&claimdesk_reminders::Reminder::new(
            customer().phone,
            "call back",
            due,
        ))
        .await
        .unwrap();

    assert_eq!(saved.id.as_deref(), Some("R1"));
    assert_eq!(desk.reminders().count(), ReminderCount::Known(1));
    desk.shutdown();
}

// ---- Assembly ----

#[tokio::test]
async fn desk_loads_from_a_config_file() {
    let server = MockServer::start().await;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(config_toml(&server, None).as_bytes()).unwrap();

    let config = claimdesk_config::load_and_validate_path(file.path()).unwrap();
    let desk = DeskContext::from_config(config).unwrap();

    assert_eq!(desk.config().agent.id, "agent42");
    assert!(desk.http().is_some());
    assert!(!desk.http().unwrap().session().is_active());
}

#[tokio::test]
async fn shutdown_detaches_everything() {
    let rest = Arc::new(MockRest::new());
    let desk = DeskContext::with_rest(claimdesk_config::DeskConfig::default(), rest.clone());
    desk.start();
    assert!(desk.bus().listener_count() > 0);

    desk.shutdown();

    assert_eq!(desk.bus().listener_count(), 0);
    desk.bus().trigger(DeskEvent::SignedOut);
    assert_eq!(desk.reminders().count(), ReminderCount::Unknown);
}

#[tokio::test]
async fn legacy_mode_claims_without_a_ticket() {
    let rest = Arc::new(MockRest::new());
    rest.respond(
        RestMethod::Create,
        service::MONOLITH,
        "claim",
        Envelope::ok(json!({ "id": "C9" })),
    );
    let mut config = claimdesk_config::DeskConfig::default();
    config.claims.legacy_no_ticket = true;
    let desk = DeskContext::with_rest(config, rest.clone());

    let claim = desk
        .claims()
        .claim(claimdesk_claims::ClaimRequest {
            customer: customer(),
            ticket_id: None,
            context: ClaimContext::regular(),
        })
        .await
        .unwrap();

    assert_eq!(claim.ticket_id, None);
    assert_eq!(claim.claimed_by.as_str(), "agent");
    assert_eq!(rest.call_count(RestMethod::Create, "ticket"), 0);
}

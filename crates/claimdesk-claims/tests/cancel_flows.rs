// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cancel-with-reason flows: continuous cancel, QA decline, provider hand-off.

use claimdesk_bus::Topic;
use claimdesk_claims::{ContinuousCancel, HandoffKind, ProviderHandoff};
use claimdesk_core::error::codes;
use claimdesk_core::types::service;
use claimdesk_core::{ActiveClaim, DeskError, RestMethod, TicketId};
use claimdesk_test_utils::TestHarness;
use claimdesk_test_utils::harness::{customer, subtype};
use serde_json::json;
use tracing_test::traced_test;

fn active() -> ActiveClaim {
    ActiveClaim {
        customer: customer(),
        ticket_id: Some(TicketId("T1".into())),
    }
}

fn cancel(reason: &str, note: Option<&str>) -> ContinuousCancel {
    ContinuousCancel {
        order_id: "O-42".into(),
        reason: reason.into(),
        note: note.map(str::to_string),
    }
}

/// Nouns called, in order, ignoring catalog reads.
fn sequence(h: &TestHarness) -> Vec<(RestMethod, String)> {
    h.rest
        .calls()
        .into_iter()
        .filter(|c| c.noun != "subtypes" && c.noun != "action_types")
        .map(|c| (c.method, c.noun))
        .collect()
}

#[tokio::test]
async fn other_reason_without_note_fails_before_any_request() {
    let h = TestHarness::new();

    let err = h
        .claims
        .cancel_continuous(&active(), cancel("Other", Some("  ")))
        .await
        .unwrap_err();

    assert!(matches!(err, DeskError::Validation(_)));
    assert!(h.rest.calls().is_empty());
    assert_eq!(h.recorder.errors(), vec!["A note is required when the reason is Other"]);
}

#[tokio::test]
async fn continuous_cancel_runs_action_note_resolve_release_in_order() {
    let h = TestHarness::new();

    let outcome = h
        .claims
        .cancel_continuous(&active(), cancel("Too expensive", Some("price went up")))
        .await
        .unwrap();

    assert!(outcome.reclaim.is_none());
    assert_eq!(
        sequence(&h),
        vec![
            (RestMethod::Update, "continuous_order".to_string()),
            (RestMethod::Create, "item".to_string()),
            (RestMethod::Update, "resolve".to_string()),
            (RestMethod::Delete, "claim".to_string()),
        ]
    );

    let action = &h.rest.calls_to(RestMethod::Update, "continuous_order")[0];
    assert_eq!(action.data["orderId"], "O-42");
    assert_eq!(action.data["status"], "canceled");
    assert_eq!(action.data["note"], "price went up");

    let item = &h.rest.calls_to(RestMethod::Create, "item")[0];
    assert_eq!(item.data["value"], "Too expensive: price went up");

    let resolve = &h.rest.calls_to(RestMethod::Update, "resolve")[0];
    assert_eq!(resolve.data["subTypeId"], subtype("Recurring Purchase Canceled"));
    assert_eq!(h.recorder.topics(), vec![Topic::CLAIMED_REMOVE]);
}

#[tokio::test]
async fn crm_sync_failure_stops_the_flow() {
    let h = TestHarness::new();
    h.script_fault(
        RestMethod::Update,
        service::MONOLITH,
        "continuous_order",
        codes::UPSTREAM_SYNC,
        "konnektive timeout",
    );

    let err = h
        .claims
        .cancel_continuous(&active(), cancel("Too expensive", None))
        .await
        .unwrap_err();

    assert!(matches!(err, DeskError::UpstreamSync { .. }));
    assert_eq!(sequence(&h), vec![(RestMethod::Update, "continuous_order".to_string())]);
    assert_eq!(h.recorder.errors(), vec!["CRM sync failed: konnektive timeout"]);
}

#[tokio::test]
#[traced_test]
async fn failed_note_append_only_warns() {
    let h = TestHarness::new();
    h.script_fault(RestMethod::Create, service::TICKETS, "item", 500, "ticket closed");

    h.claims
        .cancel_continuous(&active(), cancel("Too expensive", None))
        .await
        .unwrap();

    assert_eq!(h.rest.call_count(RestMethod::Update, "resolve"), 1);
    assert_eq!(h.rest.call_count(RestMethod::Delete, "claim"), 1);
    assert!(h.recorder.errors().is_empty());
    assert_eq!(
        h.recorder.warnings(),
        vec!["Note could not be added to the ticket: ticket closed"]
    );
    assert!(logs_contain("could not append note to ticket"));
}

#[tokio::test]
async fn ticketless_claim_skips_note_and_resolve() {
    let h = TestHarness::new();
    let active = ActiveClaim {
        customer: customer(),
        ticket_id: None,
    };

    h.claims
        .cancel_continuous(&active, cancel("Too expensive", Some("n/a")))
        .await
        .unwrap();

    assert_eq!(
        sequence(&h),
        vec![
            (RestMethod::Update, "continuous_order".to_string()),
            (RestMethod::Delete, "claim".to_string()),
        ]
    );
}

#[tokio::test]
async fn medication_switch_reclaims_under_regular_context() {
    let h = TestHarness::new();
    h.script_ticket("T5");
    h.script_claim("C5");

    let outcome = h
        .claims
        .cancel_continuous(&active(), cancel("Medication Switch", None))
        .await
        .unwrap();

    let claim = outcome.reclaim.expect("re-claim attempted").unwrap();
    assert_eq!(claim.ticket_id, Some(TicketId("T5".into())));
    assert!(!claim.continuous);
    assert_eq!(claim.customer_phone, customer().phone);

    let release_at = h.rest.position(RestMethod::Delete, "claim").unwrap();
    let ticket_at = h.rest.position(RestMethod::Create, "ticket").unwrap();
    assert!(release_at < ticket_at);

    let ticket = &h.rest.calls_to(RestMethod::Create, "ticket")[0];
    assert_eq!(ticket.data["subTypeId"], subtype("Medication Switch"));
    let reclaim = &h.rest.calls_to(RestMethod::Create, "claim")[0];
    assert_eq!(reclaim.data["continuous"], false);
    assert_eq!(reclaim.data["orderId"], serde_json::Value::Null);

    assert_eq!(h.recorder.topics(), vec![Topic::CLAIMED_REMOVE, Topic::CLAIMED_ADD]);
}

#[tokio::test]
async fn medication_switch_survives_a_lost_reclaim() {
    let h = TestHarness::new();
    h.script_ticket("T5");
    h.script_fault(RestMethod::Create, service::MONOLITH, "claim", codes::DUPLICATE_CLAIM, "taken");

    let outcome = h
        .claims
        .cancel_continuous(&active(), cancel("Medication Switch", None))
        .await
        .unwrap();

    assert!(matches!(outcome.reclaim, Some(Err(DeskError::DuplicateClaim))));
    // The cancelled ticket stays resolved; only the re-claim ticket is removed.
    assert_eq!(h.rest.call_count(RestMethod::Update, "resolve"), 1);
    let deletes = h.rest.calls_to(RestMethod::Delete, "ticket");
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].data, json!({ "ticketId": "T5" }));
    assert_eq!(h.recorder.errors(), vec!["Customer has already been claimed"]);
}

#[tokio::test]
async fn qa_decline_resolves_with_decline_subtype() {
    let h = TestHarness::new();

    h.claims
        .decline_qa(&active(), "O-9", "Incomplete intake", None)
        .await
        .unwrap();

    let action = &h.rest.calls_to(RestMethod::Update, "qa_order")[0];
    assert_eq!(action.data["status"], "declined");
    assert_eq!(action.data["reason"], "Incomplete intake");
    let resolve = &h.rest.calls_to(RestMethod::Update, "resolve")[0];
    assert_eq!(resolve.data["subTypeId"], subtype("QA Order Declined"));
    assert_eq!(h.rest.call_count(RestMethod::Delete, "claim"), 1);
}

#[tokio::test]
async fn qa_decline_requires_an_order() {
    let h = TestHarness::new();

    let err = h
        .claims
        .decline_qa(&active(), " ", "Incomplete intake", None)
        .await
        .unwrap_err();

    assert!(matches!(err, DeskError::Validation(_)));
    assert!(h.rest.calls().is_empty());
}

#[tokio::test]
async fn provider_transfer_records_handoff_and_resolves() {
    let h = TestHarness::new();

    h.claims
        .provider_handoff(
            &active(),
            ProviderHandoff {
                kind: HandoffKind::Transfer,
                provider: "Dr. Rivera".into(),
                note: Some("prefers telehealth".into()),
            },
        )
        .await
        .unwrap();

    let handoff = &h.rest.calls_to(RestMethod::Create, "provider_handoff")[0];
    assert_eq!(handoff.data["kind"], "transfer");
    assert_eq!(handoff.data["provider"], "Dr. Rivera");
    let item = &h.rest.calls_to(RestMethod::Create, "item")[0];
    assert_eq!(
        item.data["value"],
        "Provider transfer to Dr. Rivera: prefers telehealth"
    );
    let resolve = &h.rest.calls_to(RestMethod::Update, "resolve")[0];
    assert_eq!(resolve.data["subTypeId"], subtype("Provider Transfer"));
}

#[tokio::test]
async fn provider_return_needs_a_provider() {
    let h = TestHarness::new();

    let err = h
        .claims
        .provider_handoff(
            &active(),
            ProviderHandoff {
                kind: HandoffKind::Return,
                provider: String::new(),
                note: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DeskError::Validation(_)));
    assert!(h.rest.calls().is_empty());
}

// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket client requests and catalog caching.

use std::sync::Arc;

use claimdesk_core::types::service;
use claimdesk_core::{
    CustomerId, DeskError, Envelope, Phone, RestMethod, SubtypeId, TicketId, TicketItem,
    TicketService,
};
use claimdesk_test_utils::MockRest;
use claimdesk_tickets::{TicketClient, nouns};
use serde_json::json;

fn setup() -> (Arc<MockRest>, TicketClient) {
    let rest = Arc::new(MockRest::new());
    rest.respond_always(
        RestMethod::Read,
        service::TICKETS,
        nouns::SUBTYPES,
        Envelope::ok(json!([
            {"id": 1, "name": "Recurring Purchase Canceled"},
            {"id": 6, "name": "General Inquiry"}
        ])),
    )
    .respond_always(
        RestMethod::Read,
        service::TICKETS,
        nouns::ACTION_TYPES,
        Envelope::ok(json!([{"id": 10, "name": "Escalation"}])),
    );
    let client = TicketClient::new(rest.clone());
    (rest, client)
}

fn phone() -> Phone {
    Phone::parse("5551234567").unwrap()
}

#[tokio::test]
async fn create_resolves_subtype_and_returns_ticket_id() {
    let (rest, client) = setup();
    rest.respond(
        RestMethod::Create,
        service::TICKETS,
        nouns::TICKET,
        Envelope::ok(json!({"id": 314})),
    );

    let id = client
        .create(
            &phone(),
            Some(&CustomerId("cust-9".into())),
            "General Inquiry",
            &[TicketItem::order("O-1")],
        )
        .await
        .unwrap();

    assert_eq!(id, TicketId("314".into()));
    let sent = &rest.calls_to(RestMethod::Create, nouns::TICKET)[0];
    assert_eq!(
        sent.data,
        json!({
            "phone": "+15551234567",
            "customerId": "cust-9",
            "subTypeId": 6,
            "items": [{"kind": "order", "value": "O-1"}]
        })
    );
}

#[tokio::test]
async fn create_accepts_bare_id() {
    let (rest, client) = setup();
    rest.respond(
        RestMethod::Create,
        service::TICKETS,
        nouns::TICKET,
        Envelope::ok(json!("T-77")),
    );

    let id = client.create(&phone(), None, "General Inquiry", &[]).await.unwrap();
    assert_eq!(id.as_str(), "T-77");
}

#[tokio::test]
async fn create_without_id_is_an_error() {
    let (_rest, client) = setup();
    let err = client
        .create(&phone(), None, "General Inquiry", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, DeskError::Internal(_)));
}

#[tokio::test]
async fn catalogs_are_fetched_once() {
    let (rest, client) = setup();

    assert_eq!(client.subtype_id("General Inquiry").await.unwrap(), SubtypeId(6));
    assert_eq!(
        client.subtype_id("Recurring Purchase Canceled").await.unwrap(),
        SubtypeId(1)
    );
    assert_eq!(client.action_type_id("Escalation").await.unwrap().0, 10);
    assert_eq!(client.action_type_id("Escalation").await.unwrap().0, 10);

    assert_eq!(rest.call_count(RestMethod::Read, nouns::SUBTYPES), 1);
    assert_eq!(rest.call_count(RestMethod::Read, nouns::ACTION_TYPES), 1);
}

#[tokio::test]
async fn failed_catalog_fetch_is_retried() {
    let rest = Arc::new(MockRest::new());
    rest.fail_network(RestMethod::Read, service::TICKETS, nouns::SUBTYPES, "timeout")
        .respond(
            RestMethod::Read,
            service::TICKETS,
            nouns::SUBTYPES,
            Envelope::ok(json!([{"id": 6, "name": "General Inquiry"}])),
        );
    let client = TicketClient::new(rest.clone());

    assert!(client.subtype_id("General Inquiry").await.is_err());
    assert_eq!(client.subtype_id("General Inquiry").await.unwrap(), SubtypeId(6));
    assert_eq!(rest.call_count(RestMethod::Read, nouns::SUBTYPES), 2);
}

#[tokio::test]
async fn unknown_names_are_validation_errors() {
    let (_rest, client) = setup();
    assert!(matches!(
        client.subtype_id("Lost Package").await,
        Err(DeskError::Validation(_))
    ));
    assert!(matches!(
        client.action_type_id("Refund").await,
        Err(DeskError::Validation(_))
    ));
}

#[tokio::test]
async fn exists_reads_flag() {
    let (rest, client) = setup();
    rest.respond(
        RestMethod::Read,
        service::TICKETS,
        nouns::TICKET_EXISTS,
        Envelope::ok(json!({"exists": true})),
    )
    .respond(
        RestMethod::Read,
        service::TICKETS,
        nouns::TICKET_EXISTS,
        Envelope::ok(json!(false)),
    );

    let customer = CustomerId("cust-9".into());
    assert!(client.exists(&customer).await.unwrap());
    assert!(!client.exists(&customer).await.unwrap());
    assert_eq!(
        rest.calls_to(RestMethod::Read, nouns::TICKET_EXISTS)[0].data,
        json!({"customerId": "cust-9"})
    );
}

#[tokio::test]
async fn resolve_delete_item_and_action_payloads() {
    let (rest, client) = setup();
    let ticket = TicketId("T1".into());

    client.item(&TicketItem::note("hello"), &ticket).await.unwrap();
    client.action("Escalated", "Escalation", &ticket).await.unwrap();
    client.resolve(SubtypeId(1), &ticket).await.unwrap();
    client.delete(&ticket).await.unwrap();

    assert_eq!(
        rest.calls_to(RestMethod::Create, nouns::ITEM)[0].data,
        json!({"ticketId": "T1", "kind": "note", "value": "hello"})
    );
    assert_eq!(
        rest.calls_to(RestMethod::Create, nouns::ACTION)[0].data,
        json!({"ticketId": "T1", "action": "Escalated", "actionTypeId": 10})
    );
    assert_eq!(
        rest.calls_to(RestMethod::Update, nouns::RESOLVE)[0].data,
        json!({"ticketId": "T1", "subTypeId": 1})
    );
    assert_eq!(
        rest.calls_to(RestMethod::Delete, nouns::TICKET)[0].data,
        json!({"ticketId": "T1"})
    );
}

#[tokio::test]
async fn remote_faults_are_mapped() {
    let (rest, client) = setup();
    rest.respond(
        RestMethod::Update,
        service::TICKETS,
        nouns::RESOLVE,
        Envelope::fault(1001, json!({"subTypeId": ["is closed"]})),
    );

    let err = client
        .resolve(SubtypeId(1), &TicketId("T1".into()))
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "subTypeId: is closed");
}

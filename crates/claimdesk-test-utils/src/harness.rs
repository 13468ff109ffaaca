// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the coordinator, ticket client and reminder
//! notifier over one [`MockRest`] and one event bus, with the ticket catalogs
//! already scripted.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};

use claimdesk_bus::EventBus;
use claimdesk_claims::ClaimCoordinator;
use claimdesk_config::ClaimsConfig;
use claimdesk_core::types::service;
use claimdesk_core::{
    AgentId, Customer, CustomerId, Envelope, Phone, RestAdapter, RestMethod, TicketService,
};
use claimdesk_reminders::ReminderNotifier;
use claimdesk_tickets::{TicketClient, nouns};

use crate::mock_rest::MockRest;
use crate::recorder::EventRecorder;

/// Agent the harness coordinator acts as.
pub const AGENT: &str = "agent42";

/// Sub-type catalog served by the harness, covering the default claim settings.
pub const SUBTYPES: &[(&str, i64)] = &[
    ("Recurring Purchase Canceled", 1),
    ("QA Order Declined", 2),
    ("Provider Return", 3),
    ("Provider Transfer", 4),
    ("Medication Switch", 5),
    ("General Inquiry", 6),
];

/// Action-type catalog served by the harness.
pub const ACTION_TYPES: &[(&str, i64)] = &[("Escalation", 10), ("Transfer", 11)];

/// The customer most tests claim.
pub fn customer() -> Customer {
    Customer::new(phone())
        .with_id(CustomerId("cust-9".into()))
        .with_name("Ada Lovelace")
}

pub fn phone() -> Phone {
    Phone::parse("+15551234567").expect("fixture phone is valid")
}

/// Id of a sub-type in [`SUBTYPES`].
pub fn subtype(name: &str) -> i64 {
    SUBTYPES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, id)| *id)
        .expect("sub-type is in the harness catalog")
}

fn catalog(entries: &[(&str, i64)]) -> Value {
    Value::Array(
        entries
            .iter()
            .map(|(name, id)| json!({ "id": id, "name": name }))
            .collect(),
    )
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    claims: ClaimsConfig,
    refresh_interval: Duration,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            claims: ClaimsConfig::default(),
            refresh_interval: Duration::from_secs(3600),
        }
    }

    /// Allow claims without a ticket.
    pub fn legacy_no_ticket(mut self, enabled: bool) -> Self {
        self.claims.legacy_no_ticket = enabled;
        self
    }

    pub fn with_claims_config(mut self, claims: ClaimsConfig) -> Self {
        self.claims = claims;
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Build the harness. The notifier is attached to the bus.
    pub fn build(self) -> TestHarness {
        let rest = Arc::new(MockRest::new());
        rest.respond_always(
            RestMethod::Read,
            service::TICKETS,
            nouns::SUBTYPES,
            Envelope::ok(catalog(SUBTYPES)),
        )
        .respond_always(
            RestMethod::Read,
            service::TICKETS,
            nouns::ACTION_TYPES,
            Envelope::ok(catalog(ACTION_TYPES)),
        );

        let bus = Arc::new(EventBus::new());
        let recorder = EventRecorder::attach(&bus);
        let adapter: Arc<dyn RestAdapter> = rest.clone();
        let tickets = Arc::new(TicketClient::new(Arc::clone(&adapter)));
        let ticket_service: Arc<dyn TicketService> = tickets.clone();
        let claims = Arc::new(ClaimCoordinator::new(
            Arc::clone(&adapter),
            ticket_service,
            Arc::clone(&bus),
            AgentId(AGENT.into()),
            self.claims,
        ));
        let reminders = ReminderNotifier::new(adapter, Arc::clone(&bus), self.refresh_interval);
        reminders.attach();

        TestHarness {
            rest,
            bus,
            tickets,
            claims,
            reminders,
            recorder,
        }
    }
}

/// A fully wired claimdesk stack over a scripted backend.
pub struct TestHarness {
    pub rest: Arc<MockRest>,
    pub bus: Arc<EventBus>,
    pub tickets: Arc<TicketClient>,
    pub claims: Arc<ClaimCoordinator>,
    pub reminders: Arc<ReminderNotifier>,
    pub recorder: EventRecorder,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Queues a successful ticket creation.
    pub fn script_ticket(&self, ticket_id: &str) {
        self.rest.respond(
            RestMethod::Create,
            service::TICKETS,
            nouns::TICKET,
            Envelope::ok(json!({ "id": ticket_id })),
        );
    }

    /// Queues a successful claim creation.
    pub fn script_claim(&self, claim_id: &str) {
        self.rest.respond(
            RestMethod::Create,
            service::MONOLITH,
            "claim",
            Envelope::ok(json!({ "id": claim_id, "claimedBy": AGENT })),
        );
    }

    /// Queues a backend error envelope.
    pub fn script_fault(&self, method: RestMethod, service: &str, noun: &str, code: i64, msg: &str) {
        self.rest.respond(method, service, noun, Envelope::fault(code, msg));
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

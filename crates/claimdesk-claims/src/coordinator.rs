// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Claim acquisition, release, resolution and transfer.
//!
//! Every failure path publishes a user-facing message on the bus before the
//! error is returned. Composed operations issue their REST calls strictly in
//! sequence.

use std::sync::Arc;

use claimdesk_bus::{DeskEvent, EventBus, Topic};
use claimdesk_config::ClaimsConfig;
use claimdesk_core::types::service;
use claimdesk_core::{
    AgentId, Claim, ClaimContext, ClaimId, Customer, CustomerId, DeskError, Envelope, Phone,
    RestAdapter, TicketId, TicketItem, TicketService,
};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::saga::{ClaimSaga, SagaEvent};

/// Nouns on the monolith service used by the coordinator.
pub mod nouns {
    pub const CLAIM: &str = "claim";
    pub const CONTINUOUS_ORDER: &str = "continuous_order";
    pub const QA_ORDER: &str = "qa_order";
    pub const PROVIDER_HANDOFF: &str = "provider_handoff";
}

const TRANSFER_MISSING_MESSAGE: &str =
    "This claim no longer exists. It may have been released or transferred by another agent";

/// A request to claim a customer.
#[derive(Debug, Clone)]
pub struct ClaimRequest {
    pub customer: Customer,
    /// Ticket obtained before the claim. Required unless legacy mode is on.
    pub ticket_id: Option<TicketId>,
    pub context: ClaimContext,
}

/// An escalation of a claimed customer to another agent or queue.
#[derive(Debug, Clone)]
pub struct Escalation {
    pub phone: Phone,
    pub ticket_id: TicketId,
    pub target: AgentId,
    pub note: String,
}

/// Coordinates claim lifecycle operations against the backend.
pub struct ClaimCoordinator {
    rest: Arc<dyn RestAdapter>,
    tickets: Arc<dyn TicketService>,
    bus: Arc<EventBus>,
    agent: AgentId,
    settings: ClaimsConfig,
}

impl ClaimCoordinator {
    pub fn new(
        rest: Arc<dyn RestAdapter>,
        tickets: Arc<dyn TicketService>,
        bus: Arc<EventBus>,
        agent: AgentId,
        settings: ClaimsConfig,
    ) -> Self {
        Self {
            rest,
            tickets,
            bus,
            agent,
            settings,
        }
    }

    pub fn settings(&self) -> &ClaimsConfig {
        &self.settings
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub(crate) fn rest(&self) -> &Arc<dyn RestAdapter> {
        &self.rest
    }

    pub(crate) fn tickets(&self) -> &Arc<dyn TicketService> {
        &self.tickets
    }

    /// Claims a customer under an already obtained ticket.
    ///
    /// A duplicate-claim rejection deletes the ticket before the error is
    /// returned. Other rejections leave the ticket in place.
    pub async fn claim(&self, request: ClaimRequest) -> Result<Claim, DeskError> {
        let mut saga = ClaimSaga::new();
        match &request.ticket_id {
            Some(ticket_id) => saga.apply(SagaEvent::TicketCreated(ticket_id.clone()))?,
            None if self.settings.legacy_no_ticket => saga.apply(SagaEvent::SkipTicket)?,
            None => {
                return Err(self.surface(DeskError::Validation(
                    "A ticket is required to claim a customer".into(),
                )));
            }
        };
        self.run_claim(&mut saga, &request).await
    }

    /// Opens a ticket and then claims the customer under it.
    ///
    /// The claim request is only issued once the ticket id is known. If the
    /// ticket cannot be created nothing else is attempted.
    pub async fn create_ticket_then_claim(
        &self,
        customer: Customer,
        subtype: &str,
        items: &[TicketItem],
        context: ClaimContext,
    ) -> Result<Claim, DeskError> {
        let mut saga = ClaimSaga::new();
        match self
            .tickets
            .create(&customer.phone, customer.id.as_ref(), subtype, items)
            .await
        {
            Ok(ticket_id) => saga.apply(SagaEvent::TicketCreated(ticket_id))?,
            Err(err) => {
                saga.apply(SagaEvent::TicketFailed)?;
                warn!(phone = %customer.phone, error = %err, "ticket creation failed, claim not attempted");
                return Err(self.surface(err));
            }
        };

        let request = ClaimRequest {
            customer,
            ticket_id: saga.ticket_id().cloned(),
            context,
        };
        self.run_claim(&mut saga, &request).await
    }

    async fn run_claim(
        &self,
        saga: &mut ClaimSaga,
        request: &ClaimRequest,
    ) -> Result<Claim, DeskError> {
        let customer = &request.customer;
        let payload = json!({
            "phone": customer.phone,
            "customerId": customer.id,
            "customerName": customer.name,
            "ticketId": request.ticket_id,
            "orderId": request.context.order_id,
            "continuous": request.context.continuous,
            "provider": request.context.provider,
        });

        let result = self
            .rest
            .create(service::MONOLITH, nouns::CLAIM, payload)
            .await
            .and_then(Envelope::into_result)
            .and_then(|data| self.claim_record(&data, request));

        match result {
            Ok(claim) => {
                saga.apply(SagaEvent::ClaimAccepted)?;
                info!(
                    claim_id = %claim.id,
                    phone = %claim.customer_phone,
                    ticket_id = ?claim.ticket_id,
                    "customer claimed"
                );
                self.bus.trigger(DeskEvent::ClaimedAdd {
                    ticket_id: claim.ticket_id.clone(),
                    phone: claim.customer_phone.clone(),
                    customer_name: claim.customer_name.clone(),
                    customer_id: claim.customer_id.clone(),
                });
                Ok(claim)
            }
            Err(err) => {
                let duplicate = matches!(err, DeskError::DuplicateClaim);
                saga.apply(SagaEvent::ClaimRejected { duplicate })?;
                if saga.needs_compensation() {
                    self.compensate(saga).await?;
                }
                warn!(phone = %customer.phone, error = %err, state = %saga.state(), "claim rejected");
                Err(self.surface(err))
            }
        }
    }

    /// Deletes the ticket of a saga whose claim was rejected as a duplicate.
    async fn compensate(&self, saga: &mut ClaimSaga) -> Result<(), DeskError> {
        let Some(ticket_id) = saga.ticket_id().cloned() else {
            return saga.apply(SagaEvent::DeleteFailed).map(|_| ());
        };
        match self.tickets.delete(&ticket_id).await {
            Ok(()) => {
                info!(ticket_id = %ticket_id, "orphaned ticket deleted after duplicate claim");
                saga.apply(SagaEvent::TicketDeleted)?;
            }
            Err(err) => {
                warn!(ticket_id = %ticket_id, error = %err, "failed to delete orphaned ticket");
                saga.apply(SagaEvent::DeleteFailed)?;
            }
        }
        Ok(())
    }

    /// Builds the claim record from the backend response and the request.
    fn claim_record(&self, data: &Value, request: &ClaimRequest) -> Result<Claim, DeskError> {
        let id = data
            .get("id")
            .and_then(ClaimId::from_value)
            .ok_or_else(|| DeskError::Internal("claim response carried no id".into()))?;
        let customer = &request.customer;
        Ok(Claim {
            id,
            customer_phone: customer.phone.clone(),
            customer_id: customer
                .id
                .clone()
                .or_else(|| data.get("customerId").and_then(CustomerId::from_value)),
            customer_name: customer.name.clone().or_else(|| {
                data.get("customerName")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            }),
            ticket_id: request
                .ticket_id
                .clone()
                .or_else(|| data.get("ticketId").and_then(TicketId::from_value)),
            claimed_by: data
                .get("claimedBy")
                .and_then(AgentId::from_value)
                .unwrap_or_else(|| self.agent.clone()),
            order_id: request.context.order_id.clone(),
            continuous: request.context.continuous,
            provider: request.context.provider.clone(),
        })
    }

    /// Removes the claim on `phone`.
    ///
    /// `claimedRemove` is published whether or not the backend accepted the
    /// removal, so other views drop the claim either way.
    pub async fn release(&self, phone: &Phone) -> Result<(), DeskError> {
        let result = self
            .rest
            .delete(service::MONOLITH, nouns::CLAIM, json!({ "phone": phone }))
            .await
            .and_then(Envelope::into_result);

        self.bus.trigger(DeskEvent::claimed_remove(phone.clone()));

        match result {
            Ok(_) => {
                info!(phone = %phone, "claim released");
                Ok(())
            }
            Err(err) => {
                warn!(
                    phone = %phone,
                    error = %err,
                    "claim release failed but removal was already announced"
                );
                Err(self.surface(err))
            }
        }
    }

    /// Resolves the ticket and then releases the claim.
    ///
    /// A failed resolve leaves the claim in place. Without a ticket (legacy
    /// claims) only the release is performed.
    pub async fn resolve_and_release(
        &self,
        phone: &Phone,
        ticket_id: Option<&TicketId>,
        subtype: &str,
    ) -> Result<(), DeskError> {
        match ticket_id {
            Some(ticket_id) => {
                if let Err(err) = self.resolve_ticket(ticket_id, subtype).await {
                    warn!(ticket_id = %ticket_id, error = %err, "ticket resolve failed, claim kept");
                    return Err(self.surface(err));
                }
            }
            None => info!(phone = %phone, "claim has no ticket, releasing without resolve"),
        }
        self.release(phone).await
    }

    async fn resolve_ticket(&self, ticket_id: &TicketId, subtype: &str) -> Result<(), DeskError> {
        let subtype_id = self.tickets.subtype_id(subtype).await?;
        self.tickets.resolve(subtype_id, ticket_id).await
    }

    /// Reassigns the claim to `agent` and announces its removal under `topic`.
    pub async fn transfer(
        &self,
        phone: &Phone,
        agent: &AgentId,
        topic: Topic,
    ) -> Result<(), DeskError> {
        let result = self
            .rest
            .update(
                service::MONOLITH,
                nouns::CLAIM,
                json!({ "phone": phone, "claimedBy": agent }),
            )
            .await
            .and_then(Envelope::into_result);

        match result {
            Ok(_) => {
                info!(phone = %phone, to = %agent, topic = %topic, "claim transferred");
                self.bus.trigger(DeskEvent::Removed {
                    topic,
                    phone: phone.clone(),
                });
                Ok(())
            }
            Err(DeskError::ClaimNotFound) => {
                warn!(phone = %phone, "transfer target claim no longer exists");
                self.bus.error(TRANSFER_MISSING_MESSAGE);
                Err(DeskError::ClaimNotFound)
            }
            Err(err) => Err(self.surface(err)),
        }
    }

    /// Escalates a claimed customer.
    ///
    /// Appends the note and an escalation action to the ticket, then
    /// transfers the claim, announcing `escalatedRemove`.
    pub async fn escalate(&self, escalation: Escalation) -> Result<(), DeskError> {
        let note = escalation.note.trim();
        if note.is_empty() {
            return Err(self.surface(DeskError::Validation(
                "A note is required to escalate".into(),
            )));
        }

        let annotate = async {
            self.tickets
                .item(&TicketItem::note(note), &escalation.ticket_id)
                .await?;
            self.tickets
                .action(
                    &self.settings.escalation_action,
                    &self.settings.escalation_action_type,
                    &escalation.ticket_id,
                )
                .await
        };
        if let Err(err) = annotate.await {
            return Err(self.surface(err));
        }

        self.transfer(&escalation.phone, &escalation.target, Topic::ESCALATED_REMOVE)
            .await
    }

    /// Publishes the user-facing message for `err` and hands it back.
    pub(crate) fn surface(&self, err: DeskError) -> DeskError {
        self.bus.error(err.user_message());
        err
    }
}

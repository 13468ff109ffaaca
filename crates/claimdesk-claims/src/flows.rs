// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cancel-with-reason flows.
//!
//! Each flow validates its input locally, performs its domain action on the
//! monolith, appends a note to the ticket when there is one, and finishes
//! through [`ClaimCoordinator::resolve_and_release`].

use claimdesk_core::types::service;
use claimdesk_core::{ActiveClaim, Claim, ClaimContext, DeskError, Envelope, TicketItem};
use serde_json::{Value, json};
use strum::Display;
use tracing::{info, warn};

use crate::coordinator::{ClaimCoordinator, nouns};

/// Reason that requires a free-text note.
pub const OTHER_REASON: &str = "Other";

/// Cancel reason that hands the customer straight back to the agent.
pub const MEDICATION_SWITCH_REASON: &str = "Medication Switch";

/// Cancellation of a continuous (recurring) order.
#[derive(Debug, Clone)]
pub struct ContinuousCancel {
    pub order_id: String,
    pub reason: String,
    pub note: Option<String>,
}

/// Result of a successful continuous-order cancellation.
#[derive(Debug)]
pub struct CancelOutcome {
    /// The follow-up claim for a medication switch. A failed re-claim does
    /// not fail the cancellation.
    pub reclaim: Option<Result<Claim, DeskError>>,
}

/// Direction of a provider hand-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum HandoffKind {
    Return,
    Transfer,
}

#[derive(Debug, Clone)]
pub struct ProviderHandoff {
    pub kind: HandoffKind,
    pub provider: String,
    pub note: Option<String>,
}

impl ClaimCoordinator {
    /// Cancels a continuous order and resolves the claim.
    ///
    /// For a medication switch the customer is immediately re-claimed under a
    /// fresh ticket in a regular context.
    pub async fn cancel_continuous(
        &self,
        active: &ActiveClaim,
        cancel: ContinuousCancel,
    ) -> Result<CancelOutcome, DeskError> {
        let note = self.check_reason(&cancel.reason, cancel.note.as_deref())?;
        if cancel.order_id.trim().is_empty() {
            return Err(self.surface(DeskError::Validation(
                "An order is required to cancel".into(),
            )));
        }

        self.domain_action(
            nouns::CONTINUOUS_ORDER,
            json!({
                "orderId": cancel.order_id,
                "phone": active.customer.phone,
                "status": "canceled",
                "reason": cancel.reason,
                "note": note,
            }),
        )
        .await?;
        info!(order_id = %cancel.order_id, reason = %cancel.reason, "continuous order canceled");

        self.append_note(active, &cancel.reason, note.as_deref()).await;
        self.resolve_and_release(
            &active.customer.phone,
            active.ticket_id.as_ref(),
            &self.settings().continuous_cancel_subtype,
        )
        .await?;

        if cancel.reason != MEDICATION_SWITCH_REASON {
            return Ok(CancelOutcome { reclaim: None });
        }

        let items = [
            TicketItem::order(cancel.order_id.clone()),
            TicketItem::note(format!("Medication switch from order {}", cancel.order_id)),
        ];
        let reclaim = self
            .create_ticket_then_claim(
                active.customer.clone(),
                &self.settings().medication_switch_subtype,
                &items,
                ClaimContext::regular(),
            )
            .await;
        if let Err(err) = &reclaim {
            warn!(phone = %active.customer.phone, error = %err, "re-claim after medication switch failed");
        }
        Ok(CancelOutcome {
            reclaim: Some(reclaim),
        })
    }

    /// Declines a QA order and resolves the claim.
    pub async fn decline_qa(
        &self,
        active: &ActiveClaim,
        order_id: &str,
        reason: &str,
        note: Option<&str>,
    ) -> Result<(), DeskError> {
        let note = self.check_reason(reason, note)?;
        if order_id.trim().is_empty() {
            return Err(self.surface(DeskError::Validation(
                "An order is required to decline".into(),
            )));
        }

        self.domain_action(
            nouns::QA_ORDER,
            json!({
                "orderId": order_id,
                "status": "declined",
                "reason": reason,
                "note": note,
            }),
        )
        .await?;
        info!(order_id, reason, "QA order declined");

        self.append_note(active, reason, note.as_deref()).await;
        self.resolve_and_release(
            &active.customer.phone,
            active.ticket_id.as_ref(),
            &self.settings().qa_decline_subtype,
        )
        .await
    }

    /// Returns the customer to, or transfers them to, an external provider
    /// and resolves the claim.
    pub async fn provider_handoff(
        &self,
        active: &ActiveClaim,
        handoff: ProviderHandoff,
    ) -> Result<(), DeskError> {
        let provider = handoff.provider.trim();
        if provider.is_empty() {
            return Err(self.surface(DeskError::Validation("A provider is required".into())));
        }
        let note = handoff
            .note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());

        let envelope = self
            .rest()
            .create(
                service::MONOLITH,
                nouns::PROVIDER_HANDOFF,
                json!({
                    "phone": active.customer.phone,
                    "provider": provider,
                    "kind": handoff.kind.to_string(),
                    "note": note,
                }),
            )
            .await;
        if let Err(err) = envelope.and_then(Envelope::into_result) {
            return Err(self.surface(err));
        }
        info!(provider, kind = %handoff.kind, "provider hand-off recorded");

        let label = format!("Provider {} to {provider}", handoff.kind);
        self.append_note(active, &label, note).await;

        let subtype = match handoff.kind {
            HandoffKind::Return => &self.settings().provider_return_subtype,
            HandoffKind::Transfer => &self.settings().provider_transfer_subtype,
        };
        self.resolve_and_release(&active.customer.phone, active.ticket_id.as_ref(), subtype)
            .await
    }

    /// Checks a cancel reason and returns the trimmed note, if any.
    fn check_reason(&self, reason: &str, note: Option<&str>) -> Result<Option<String>, DeskError> {
        let note = note.map(str::trim).filter(|n| !n.is_empty());
        if reason.trim().is_empty() {
            return Err(self.surface(DeskError::Validation("A reason is required".into())));
        }
        if reason == OTHER_REASON && note.is_none() {
            return Err(self.surface(DeskError::Validation(
                "A note is required when the reason is Other".into(),
            )));
        }
        Ok(note.map(str::to_string))
    }

    async fn domain_action(&self, noun: &str, payload: Value) -> Result<(), DeskError> {
        let result = self
            .rest()
            .update(service::MONOLITH, noun, payload)
            .await
            .and_then(Envelope::into_result);
        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                warn!(noun, error = %err, "domain action failed");
                Err(self.surface(err))
            }
        }
    }

    /// Appends `label` and `note` to the claim's ticket. Failure only warns.
    async fn append_note(&self, active: &ActiveClaim, label: &str, note: Option<&str>) {
        let Some(ticket_id) = &active.ticket_id else {
            return;
        };
        let text = match note {
            Some(note) => format!("{label}: {note}"),
            None => label.to_string(),
        };
        if let Err(err) = self.tickets().item(&TicketItem::note(text), ticket_id).await {
            warn!(ticket_id = %ticket_id, error = %err, "could not append note to ticket");
            self.bus()
                .warning(format!("Note could not be added to the ticket: {}", err.user_message()));
        }
    }
}

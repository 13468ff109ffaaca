// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! State machine for the ticket-then-claim composition.
//!
//! ```text
//! Pending -> TicketCreated -> Claimed
//!                          -> ClaimFailed -> Failed   (duplicate: ticket deleted)
//!                          -> Failed                  (any other rejection)
//! Pending -> Failed                                   (ticket create failed)
//! Pending -> Unticketed -> Claimed | Failed           (legacy, no ticket)
//! ```
//!
//! Only `ClaimFailed` requires compensation, and compensation runs at most
//! once because `ClaimFailed` is left on the first delete outcome.

use claimdesk_core::{DeskError, TicketId};
use strum::Display;
use tracing::debug;

/// Where a claim attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SagaState {
    Pending,
    TicketCreated,
    Unticketed,
    Claimed,
    /// Claim rejected as a duplicate; the ticket must be deleted.
    ClaimFailed,
    Failed,
}

/// Outcome of one step, fed into [`ClaimSaga::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SagaEvent {
    TicketCreated(TicketId),
    TicketFailed,
    SkipTicket,
    ClaimAccepted,
    ClaimRejected { duplicate: bool },
    TicketDeleted,
    DeleteFailed,
}

/// One claim attempt.
#[derive(Debug, Clone)]
pub struct ClaimSaga {
    ticket_id: Option<TicketId>,
    state: SagaState,
    trail: Vec<SagaState>,
    compensated: bool,
}

impl ClaimSaga {
    pub fn new() -> Self {
        Self {
            ticket_id: None,
            state: SagaState::Pending,
            trail: vec![SagaState::Pending],
            compensated: false,
        }
    }

    pub fn state(&self) -> SagaState {
        self.state
    }

    pub fn ticket_id(&self) -> Option<&TicketId> {
        self.ticket_id.as_ref()
    }

    /// Every state visited, in order.
    pub fn trail(&self) -> &[SagaState] {
        &self.trail
    }

    /// Whether the compensating delete succeeded.
    pub fn compensated(&self) -> bool {
        self.compensated
    }

    pub fn needs_compensation(&self) -> bool {
        self.state == SagaState::ClaimFailed
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, SagaState::Claimed | SagaState::Failed)
    }

    /// Advances the saga. Events that do not apply to the current state are
    /// rejected and leave the saga unchanged.
    pub fn apply(&mut self, event: SagaEvent) -> Result<SagaState, DeskError> {
        use SagaEvent as E;
        use SagaState as S;

        let next = match (self.state, &event) {
            (S::Pending, E::TicketCreated(id)) => {
                self.ticket_id = Some(id.clone());
                S::TicketCreated
            }
            (S::Pending, E::TicketFailed) => S::Failed,
            (S::Pending, E::SkipTicket) => S::Unticketed,
            (S::TicketCreated | S::Unticketed, E::ClaimAccepted) => S::Claimed,
            (S::TicketCreated, E::ClaimRejected { duplicate: true }) => S::ClaimFailed,
            (S::TicketCreated | S::Unticketed, E::ClaimRejected { .. }) => S::Failed,
            (S::ClaimFailed, E::TicketDeleted) => {
                self.compensated = true;
                S::Failed
            }
            (S::ClaimFailed, E::DeleteFailed) => S::Failed,
            (state, event) => {
                return Err(DeskError::Internal(format!(
                    "claim saga cannot apply {event:?} in state {state}"
                )));
            }
        };
        self.enter(next);
        Ok(next)
    }

    fn enter(&mut self, next: SagaState) {
        debug!(from = %self.state, to = %next, ticket_id = ?self.ticket_id, "claim saga transition");
        self.state = next;
        self.trail.push(next);
    }
}

impl Default for ClaimSaga {
    fn default() -> Self {
        Self::new()
    }
}

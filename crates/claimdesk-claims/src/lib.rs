// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Claim lifecycle coordination for claimdesk.
//!
//! A claim gives one agent exclusive working ownership of one customer
//! conversation, keyed by phone number. The backend is the authority on
//! exclusivity; the [`ClaimCoordinator`] reflects its decisions on the event
//! bus and cleans up tickets left behind by lost claim races.
//!
//! - [`coordinator`]: claim, release, resolve, transfer and escalate
//! - [`flows`]: cancel-with-reason specializations of resolve and release
//! - [`saga`]: the ticket-then-claim state machine

pub mod coordinator;
pub mod flows;
pub mod saga;

pub use coordinator::{ClaimCoordinator, ClaimRequest, Escalation};
pub use flows::{
    CancelOutcome, ContinuousCancel, HandoffKind, MEDICATION_SWITCH_REASON, OTHER_REASON,
    ProviderHandoff,
};
pub use saga::{ClaimSaga, SagaEvent, SagaState};

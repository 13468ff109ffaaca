// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket service client for claimdesk.
//!
//! [`TicketClient`] implements [`claimdesk_core::TicketService`] on top of a
//! [`claimdesk_core::RestAdapter`], talking to the `tickets` service.

pub mod catalog;
pub mod client;

pub use catalog::Catalog;
pub use client::{TicketClient, nouns};

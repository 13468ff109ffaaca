// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits at the seams between the coordinator and the backends.
//!
//! Both traits use `#[async_trait]` so they can be held as trait objects.

pub mod rest;
pub mod tickets;

pub use rest::RestAdapter;
pub use tickets::TicketService;

// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP REST adapter for the claimdesk backends.
//!
//! [`HttpRestClient`] implements [`claimdesk_core::RestAdapter`] over reqwest
//! and owns the agent [`Session`].

pub mod client;
pub mod session;

pub use client::HttpRestClient;
pub use session::{Session, SessionState};

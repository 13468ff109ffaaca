// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event and topic types carried by the bus.

use std::borrow::Cow;
use std::fmt;

use claimdesk_core::{AgentId, CustomerId, Phone, TicketId};

/// Name of a bus topic.
///
/// The well-known topics are associated constants. Removal topics are open
/// ended: callers pick the name that tells listeners why a claim went away.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic(Cow<'static, str>);

impl Topic {
    pub const CLAIMED_ADD: Topic = Topic(Cow::Borrowed("claimedAdd"));
    pub const CLAIMED_REMOVE: Topic = Topic(Cow::Borrowed("claimedRemove"));
    pub const ESCALATED_REMOVE: Topic = Topic(Cow::Borrowed("escalatedRemove"));
    pub const SIGNED_IN: Topic = Topic(Cow::Borrowed("signedIn"));
    pub const SIGNED_OUT: Topic = Topic(Cow::Borrowed("signedOut"));
    pub const ERROR: Topic = Topic(Cow::Borrowed("error"));
    pub const WARNING: Topic = Topic(Cow::Borrowed("warning"));

    /// A caller-defined topic such as `transferredRemove`.
    pub fn custom(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A notification published on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeskEvent {
    /// A claim was created.
    ClaimedAdd {
        ticket_id: Option<TicketId>,
        phone: Phone,
        customer_name: Option<String>,
        customer_id: Option<CustomerId>,
    },
    /// A claim went away; `topic` says why (resolved, transferred, escalated).
    Removed { topic: Topic, phone: Phone },
    SignedIn { agent: AgentId },
    SignedOut,
    /// User-facing error message.
    Error(String),
    /// User-facing warning message.
    Warning(String),
}

impl DeskEvent {
    /// The topic this event is delivered under.
    pub fn topic(&self) -> Topic {
        match self {
            Self::ClaimedAdd { .. } => Topic::CLAIMED_ADD,
            Self::Removed { topic, .. } => topic.clone(),
            Self::SignedIn { .. } => Topic::SIGNED_IN,
            Self::SignedOut => Topic::SIGNED_OUT,
            Self::Error(_) => Topic::ERROR,
            Self::Warning(_) => Topic::WARNING,
        }
    }

    /// Shorthand for a removal under `claimedRemove`.
    pub fn claimed_remove(phone: Phone) -> Self {
        Self::Removed {
            topic: Topic::CLAIMED_REMOVE,
            phone,
        }
    }
}

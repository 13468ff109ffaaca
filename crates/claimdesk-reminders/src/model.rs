// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reminder records and the cached count.

use chrono::{DateTime, Utc};
use claimdesk_core::Phone;
use serde::{Deserialize, Serialize};

/// A scheduled follow-up with a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    /// Assigned by the backend; absent until the reminder is saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub customer_phone: Phone,
    #[serde(default)]
    pub note: String,
    pub due_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved: bool,
}

impl Reminder {
    pub fn new(customer_phone: Phone, note: impl Into<String>, due_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            customer_phone,
            note: note.into(),
            due_at,
            resolved: false,
        }
    }
}

/// Number of unresolved reminders as last seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReminderCount {
    /// Nothing has been fetched since startup.
    #[default]
    Unknown,
    Known(u64),
}

impl ReminderCount {
    pub fn value(self) -> Option<u64> {
        match self {
            Self::Unknown => None,
            Self::Known(n) => Some(n),
        }
    }
}

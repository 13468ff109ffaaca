// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reminder notifier for claimdesk.
//!
//! Reminders are scheduled follow-ups with a customer. The desk only keeps the
//! number of unresolved reminders, published to subscribers by the
//! [`ReminderNotifier`].

pub mod model;
pub mod notifier;

pub use model::{Reminder, ReminderCount};
pub use notifier::{CountCallback, FetchOutcome, ReminderNotifier, SubscriberId, nouns};

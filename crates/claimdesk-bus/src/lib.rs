// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process event bus for claimdesk.
//!
//! Listeners register for one topic (or all topics) and are invoked
//! synchronously, in registration order, on the publishing thread. The
//! listener list is snapshotted before delivery, so a listener may add or
//! remove listeners (including itself) without affecting the delivery in
//! progress. Delivery is best-effort: nothing is persisted or retried.

pub mod events;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::debug;

pub use events::{DeskEvent, Topic};

/// Callback invoked for each delivered event.
pub type Listener = Arc<dyn Fn(&DeskEvent) + Send + Sync>;

/// Handle returned by [`EventBus::add`], used to remove the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registration {
    id: ListenerId,
    /// `None` receives every topic.
    topic: Option<Topic>,
    listener: Listener,
}

/// Process-wide publish/subscribe channel keyed by topic.
pub struct EventBus {
    registrations: Mutex<Vec<Registration>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            registrations: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers a listener for a single topic.
    pub fn add<F>(&self, topic: Topic, listener: F) -> ListenerId
    where
        F: Fn(&DeskEvent) + Send + Sync + 'static,
    {
        self.register(Some(topic), Arc::new(listener))
    }

    /// Registers a listener for every topic.
    pub fn add_all<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&DeskEvent) + Send + Sync + 'static,
    {
        self.register(None, Arc::new(listener))
    }

    fn register(&self, topic: Option<Topic>, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registrations.lock().push(Registration {
            id,
            topic,
            listener,
        });
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut registrations = self.registrations.lock();
        let before = registrations.len();
        registrations.retain(|r| r.id != id);
        registrations.len() != before
    }

    /// Delivers `event` to every matching listener and returns how many ran.
    pub fn trigger(&self, event: DeskEvent) -> usize {
        let topic = event.topic();
        let snapshot: Vec<Listener> = self
            .registrations
            .lock()
            .iter()
            .filter(|r| r.topic.as_ref().is_none_or(|t| *t == topic))
            .map(|r| Arc::clone(&r.listener))
            .collect();

        debug!(topic = %topic, listeners = snapshot.len(), "delivering event");
        for listener in &snapshot {
            listener(&event);
        }
        snapshot.len()
    }

    /// Publishes a user-facing error message.
    pub fn error(&self, message: impl Into<String>) {
        self.trigger(DeskEvent::Error(message.into()));
    }

    /// Publishes a user-facing warning message.
    pub fn warning(&self, message: impl Into<String>) {
        self.trigger(DeskEvent::Warning(message.into()));
    }

    pub fn listener_count(&self) -> usize {
        self.registrations.lock().len()
    }

    /// Drops every listener.
    pub fn clear(&self) {
        self.registrations.lock().clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

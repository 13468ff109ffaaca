// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Captures every event published on a bus.

use std::sync::Arc;

use parking_lot::Mutex;

use claimdesk_bus::{DeskEvent, EventBus, ListenerId, Topic};

/// Records bus events in delivery order.
pub struct EventRecorder {
    events: Arc<Mutex<Vec<DeskEvent>>>,
    id: ListenerId,
}

impl EventRecorder {
    /// Starts recording every topic on `bus`.
    pub fn attach(bus: &EventBus) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let id = bus.add_all(move |event| sink.lock().push(event.clone()));
        Self { events, id }
    }

    pub fn listener_id(&self) -> ListenerId {
        self.id
    }

    pub fn events(&self) -> Vec<DeskEvent> {
        self.events.lock().clone()
    }

    pub fn topics(&self) -> Vec<Topic> {
        self.events.lock().iter().map(DeskEvent::topic).collect()
    }

    /// Messages published on `error`.
    pub fn errors(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                DeskEvent::Error(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Messages published on `warning`.
    pub fn warnings(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                DeskEvent::Warning(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, topic: &Topic) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.topic() == *topic)
            .count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

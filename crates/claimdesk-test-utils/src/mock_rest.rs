// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted REST adapter for deterministic testing.
//!
//! `MockRest` implements `RestAdapter` with responses queued per route
//! (method, service, noun) and records every call it receives, in order.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::debug;

use claimdesk_core::{DeskError, Envelope, RestAdapter, RestMethod};

type Route = (RestMethod, String, String);

#[derive(Debug, Clone)]
enum Scripted {
    Envelope(Envelope),
    Network(String),
}

impl Scripted {
    fn into_result(self) -> Result<Envelope, DeskError> {
        match self {
            Self::Envelope(envelope) => Ok(envelope),
            Self::Network(message) => Err(DeskError::network(message)),
        }
    }
}

/// One request received by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: RestMethod,
    pub service: String,
    pub noun: String,
    pub data: Value,
}

/// Holds calls on a route until opened.
#[derive(Clone)]
pub struct Gate {
    semaphore: Arc<Semaphore>,
}

impl Gate {
    /// Lets every held and future call through.
    pub fn open(&self) {
        self.semaphore.add_permits(1024);
    }
}

/// A mock REST adapter that returns scripted envelopes.
///
/// Queued responses are used first, in FIFO order. When a route's queue is
/// empty its sticky default is returned, and without a default an empty
/// success envelope.
#[derive(Default)]
pub struct MockRest {
    queued: Mutex<HashMap<Route, VecDeque<Scripted>>>,
    defaults: Mutex<HashMap<Route, Scripted>>,
    gates: Mutex<HashMap<Route, Gate>>,
    calls: Mutex<Vec<RecordedCall>>,
}

fn route(method: RestMethod, service: &str, noun: &str) -> Route {
    (method, service.to_string(), noun.to_string())
}

impl MockRest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one response for a route.
    pub fn respond(&self, method: RestMethod, service: &str, noun: &str, envelope: Envelope) -> &Self {
        self.queued
            .lock()
            .entry(route(method, service, noun))
            .or_default()
            .push_back(Scripted::Envelope(envelope));
        self
    }

    /// Sets the response returned once a route's queue is exhausted.
    pub fn respond_always(
        &self,
        method: RestMethod,
        service: &str,
        noun: &str,
        envelope: Envelope,
    ) -> &Self {
        self.defaults
            .lock()
            .insert(route(method, service, noun), Scripted::Envelope(envelope));
        self
    }

    /// Queues a transport failure for a route.
    pub fn fail_network(&self, method: RestMethod, service: &str, noun: &str, message: &str) -> &Self {
        self.queued
            .lock()
            .entry(route(method, service, noun))
            .or_default()
            .push_back(Scripted::Network(message.to_string()));
        self
    }

    /// Holds every call on a route until the returned gate is opened.
    ///
    /// Calls are recorded before they wait, so a held call is visible in
    /// [`MockRest::calls`].
    pub fn gate(&self, method: RestMethod, service: &str, noun: &str) -> Gate {
        let gate = Gate {
            semaphore: Arc::new(Semaphore::new(0)),
        };
        self.gates
            .lock()
            .insert(route(method, service, noun), gate.clone());
        gate
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Calls received for a method and noun, on any service.
    pub fn calls_to(&self, method: RestMethod, noun: &str) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.method == method && c.noun == noun)
            .cloned()
            .collect()
    }

    pub fn call_count(&self, method: RestMethod, noun: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.method == method && c.noun == noun)
            .count()
    }

    /// Position of the first call matching method and noun.
    pub fn position(&self, method: RestMethod, noun: &str) -> Option<usize> {
        self.calls
            .lock()
            .iter()
            .position(|c| c.method == method && c.noun == noun)
    }

    fn next_response(&self, key: &Route) -> Scripted {
        if let Some(next) = self.queued.lock().get_mut(key).and_then(VecDeque::pop_front) {
            return next;
        }
        self.defaults
            .lock()
            .get(key)
            .cloned()
            .unwrap_or_else(|| Scripted::Envelope(Envelope::default()))
    }
}

#[async_trait]
impl RestAdapter for MockRest {
    async fn call(
        &self,
        method: RestMethod,
        service: &str,
        noun: &str,
        data: Value,
    ) -> Result<Envelope, DeskError> {
        debug!(%method, service, noun, "mock rest call");
        self.calls.lock().push(RecordedCall {
            method,
            service: service.to_string(),
            noun: noun.to_string(),
            data,
        });

        let key = route(method, service, noun);
        let gate = self.gates.lock().get(&key).cloned();
        if let Some(gate) = gate {
            let _permit = gate.semaphore.acquire().await;
        }

        self.next_response(&key).into_result()
    }
}

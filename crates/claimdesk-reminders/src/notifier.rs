// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unresolved reminder count, kept fresh from the backend.
//!
//! The [`ReminderNotifier`] caches the number of unresolved reminders and
//! pushes every change to its subscribers. It:
//! - fetches at most one count at a time; a fetch requested while another is
//!   outstanding is dropped
//! - refreshes on a fixed interval after every completed fetch
//! - refetches on sign-in and after every reminder mutation
//! - forces the count to zero on sign-out, discarding any fetch that was
//!   still outstanding; a fetch dropped behind such a stale fetch is retried
//!   once the stale one has been discarded

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use claimdesk_bus::{EventBus, ListenerId, Topic};
use claimdesk_core::types::service;
use claimdesk_core::{DeskError, Envelope, RestAdapter};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::model::{Reminder, ReminderCount};

/// Nouns on the monolith service used by the notifier.
pub mod nouns {
    pub const REMINDER: &str = "reminder";
    pub const REMINDERS: &str = "reminders";
    pub const REMINDER_COUNT: &str = "reminder_count";
}

/// Callback receiving every new count.
pub type CountCallback = Arc<dyn Fn(ReminderCount) + Send + Sync>;

/// Handle returned by [`ReminderNotifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// What a call to [`ReminderNotifier::fetch_count`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched(u64),
    /// Another fetch was outstanding.
    Dropped,
    /// The request failed; the cached count is unchanged.
    Failed,
    /// A sign-out happened while the request was outstanding.
    Discarded,
}

/// Clears the in-flight flag when a fetch ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ReminderNotifier {
    rest: Arc<dyn RestAdapter>,
    bus: Arc<EventBus>,
    interval: Duration,
    count: Mutex<ReminderCount>,
    in_flight: AtomicBool,
    /// Bumped on sign-out; a fetch that sees it change discards its result.
    epoch: AtomicU64,
    /// Epoch captured by the outstanding fetch.
    fetch_epoch: AtomicU64,
    /// Set when a fetch was dropped behind one that will be discarded.
    refetch_after_discard: AtomicBool,
    /// Refresh timer, tagged with the generation that scheduled it.
    timer: Mutex<Option<(u64, JoinHandle<()>)>>,
    timer_generation: AtomicU64,
    subscribers: Mutex<Vec<(SubscriberId, CountCallback)>>,
    next_subscriber: AtomicU64,
    listeners: Mutex<Vec<ListenerId>>,
}

impl ReminderNotifier {
    pub fn new(rest: Arc<dyn RestAdapter>, bus: Arc<EventBus>, interval: Duration) -> Arc<Self> {
        Arc::new(Self {
            rest,
            bus,
            interval,
            count: Mutex::new(ReminderCount::Unknown),
            in_flight: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
            fetch_epoch: AtomicU64::new(0),
            refetch_after_discard: AtomicBool::new(false),
            timer: Mutex::new(None),
            timer_generation: AtomicU64::new(0),
            subscribers: Mutex::new(Vec::new()),
            next_subscriber: AtomicU64::new(1),
            listeners: Mutex::new(Vec::new()),
        })
    }

    pub fn count(&self) -> ReminderCount {
        *self.count.lock()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a refresh timer is pending.
    pub fn refresh_scheduled(&self) -> bool {
        self.timer.lock().is_some()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriberId
    where
        F: Fn(ReminderCount) + Send + Sync + 'static,
    {
        let id = SubscriberId(self.next_subscriber.fetch_add(1, Ordering::Relaxed));
        self.subscribers.lock().push((id, Arc::new(callback)));
        id
    }

    /// Removes a subscriber. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    /// Calls every subscriber with `count`, on the current thread.
    fn notify(&self, count: ReminderCount) {
        let snapshot: Vec<CountCallback> = self
            .subscribers
            .lock()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in &snapshot {
            callback(count);
        }
    }

    /// Fetches the unresolved count, unless a fetch is already outstanding.
    pub async fn fetch_count(self: &Arc<Self>) -> FetchOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            if self.epoch.load(Ordering::Acquire) != self.fetch_epoch.load(Ordering::Acquire) {
                self.refetch_after_discard.store(true, Ordering::Release);
                // The stale fetch may have finished between the two checks.
                if !self.in_flight.load(Ordering::Acquire)
                    && self.refetch_after_discard.swap(false, Ordering::AcqRel)
                {
                    self.spawn_fetch();
                }
            }
            debug!("reminder count fetch already in flight, dropping request");
            return FetchOutcome::Dropped;
        }
        let guard = InFlight(&self.in_flight);
        let epoch = self.epoch.load(Ordering::Acquire);
        self.fetch_epoch.store(epoch, Ordering::Release);

        let result = self
            .rest
            .read(
                service::MONOLITH,
                nouns::REMINDER_COUNT,
                json!({ "resolved": false }),
            )
            .await
            .and_then(Envelope::into_result)
            .and_then(|data| parse_count(&data));

        if self.epoch.load(Ordering::Acquire) != epoch {
            debug!("signed out during reminder count fetch, discarding result");
            drop(guard);
            if self.refetch_after_discard.swap(false, Ordering::AcqRel) {
                debug!("retrying reminder count fetch dropped during sign-out");
                self.spawn_fetch();
            }
            return FetchOutcome::Discarded;
        }
        self.refetch_after_discard.store(false, Ordering::Release);

        match result {
            Ok(count) => {
                *self.count.lock() = ReminderCount::Known(count);
                self.schedule_refresh();
                debug!(count, "reminder count refreshed");
                self.notify(ReminderCount::Known(count));
                FetchOutcome::Fetched(count)
            }
            Err(err) => {
                warn!(error = %err, "reminder count fetch failed");
                self.schedule_refresh();
                FetchOutcome::Failed
            }
        }
    }

    /// Runs [`ReminderNotifier::fetch_count`] on the current runtime.
    fn spawn_fetch(self: &Arc<Self>) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let notifier = Arc::clone(self);
                handle.spawn(async move {
                    notifier.fetch_count().await;
                });
            }
            Err(_) => warn!("no async runtime, reminder count not fetched"),
        }
    }

    /// Replaces any pending refresh with one `interval` from now.
    fn schedule_refresh(self: &Arc<Self>) {
        let generation = self.timer_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let weak: Weak<Self> = Arc::downgrade(self);
        let interval = self.interval;

        let task = tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            let Some(notifier) = weak.upgrade() else {
                return;
            };
            {
                let mut timer = notifier.timer.lock();
                if timer.as_ref().map(|(current, _)| *current) != Some(generation) {
                    return;
                }
                timer.take();
            }
            debug!("reminder count refresh timer fired");
            notifier.fetch_count().await;
        });

        if let Some((_, previous)) = self.timer.lock().replace((generation, task)) {
            previous.abort();
        }
    }

    fn cancel_refresh(&self) {
        if let Some((_, task)) = self.timer.lock().take() {
            task.abort();
        }
    }

    /// Resets to zero without a network call.
    pub fn signed_out(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.cancel_refresh();
        *self.count.lock() = ReminderCount::Known(0);
        info!("signed out, reminder count reset");
        self.notify(ReminderCount::Known(0));
    }

    /// Starts following `signedIn` and `signedOut` on the bus.
    pub fn attach(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let signed_in = self.bus.add(Topic::SIGNED_IN, move |_| {
            if let Some(notifier) = weak.upgrade() {
                notifier.spawn_fetch();
            }
        });

        let weak = Arc::downgrade(self);
        let signed_out = self.bus.add(Topic::SIGNED_OUT, move |_| {
            if let Some(notifier) = weak.upgrade() {
                notifier.signed_out();
            }
        });

        self.listeners.lock().extend([signed_in, signed_out]);
    }

    /// Stops following the bus and cancels the refresh timer.
    pub fn detach(&self) {
        for id in self.listeners.lock().drain(..) {
            self.bus.remove(id);
        }
        self.cancel_refresh();
    }

    /// Lists reminders, optionally including resolved ones.
    pub async fn list(&self, include_resolved: bool) -> Result<Vec<Reminder>, DeskError> {
        let query = if include_resolved {
            Value::Null
        } else {
            json!({ "resolved": false })
        };
        let data = self
            .send(self.rest.read(service::MONOLITH, nouns::REMINDERS, query).await)?;
        if data.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(data)
            .map_err(|e| DeskError::Internal(format!("malformed reminder listing: {e}")))
    }

    /// Saves a new reminder and returns it with its assigned id.
    pub async fn add(self: &Arc<Self>, reminder: &Reminder) -> Result<Reminder, DeskError> {
        let data = self.send(
            self.rest
                .create(service::MONOLITH, nouns::REMINDER, to_payload(reminder)?)
                .await,
        )?;
        let mut saved = reminder.clone();
        if let Some(id) = data.get("id").and_then(id_text) {
            saved.id = Some(id);
        }
        info!(id = ?saved.id, phone = %saved.customer_phone, "reminder added");
        self.fetch_count().await;
        Ok(saved)
    }

    pub async fn update(self: &Arc<Self>, reminder: &Reminder) -> Result<(), DeskError> {
        let id = require_id(reminder).map_err(|e| self.reject(e))?;
        self.send(
            self.rest
                .update(service::MONOLITH, nouns::REMINDER, to_payload(reminder)?)
                .await,
        )?;
        info!(id, "reminder updated");
        self.fetch_count().await;
        Ok(())
    }

    pub async fn resolve(self: &Arc<Self>, reminder: &Reminder) -> Result<(), DeskError> {
        let id = require_id(reminder).map_err(|e| self.reject(e))?;
        self.send(
            self.rest
                .update(
                    service::MONOLITH,
                    nouns::REMINDER,
                    json!({ "id": id, "resolved": true }),
                )
                .await,
        )?;
        info!(id, "reminder resolved");
        self.fetch_count().await;
        Ok(())
    }

    pub async fn remove(self: &Arc<Self>, reminder: &Reminder) -> Result<(), DeskError> {
        let id = require_id(reminder).map_err(|e| self.reject(e))?;
        self.send(
            self.rest
                .delete(service::MONOLITH, nouns::REMINDER, json!({ "id": id }))
                .await,
        )?;
        info!(id, "reminder removed");
        self.fetch_count().await;
        Ok(())
    }

    /// Unwraps a response, publishing the failure on the bus.
    fn send(&self, response: Result<Envelope, DeskError>) -> Result<Value, DeskError> {
        response
            .and_then(Envelope::into_result)
            .map_err(|err| self.reject(err))
    }

    fn reject(&self, err: DeskError) -> DeskError {
        warn!(error = %err, "reminder request failed");
        self.bus.error(err.user_message());
        err
    }
}

fn parse_count(data: &Value) -> Result<u64, DeskError> {
    data.as_u64()
        .or_else(|| data.get("count").and_then(Value::as_u64))
        .ok_or_else(|| DeskError::Internal(format!("unexpected reminder count payload: {data}")))
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn require_id(reminder: &Reminder) -> Result<&str, DeskError> {
    reminder
        .id
        .as_deref()
        .ok_or_else(|| DeskError::Validation("Reminder has not been saved yet".into()))
}

fn to_payload(reminder: &Reminder) -> Result<Value, DeskError> {
    serde_json::to_value(reminder)
        .map_err(|e| DeskError::Internal(format!("failed to encode reminder: {e}")))
}

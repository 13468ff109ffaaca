// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Claimdesk - claim and ticket lifecycle coordination for support agents.
//!
//! [`DeskContext`] wires the event bus, REST client, ticket client, claim
//! coordinator and reminder notifier together from a [`DeskConfig`].

use std::sync::Arc;
use std::time::Duration;

use claimdesk_bus::EventBus;
use claimdesk_claims::ClaimCoordinator;
use claimdesk_config::DeskConfig;
use claimdesk_core::{AgentId, DeskError, RestAdapter, TicketService};
use claimdesk_reminders::ReminderNotifier;
use claimdesk_rest::HttpRestClient;
use claimdesk_tickets::TicketClient;
use tracing::info;

/// The assembled desk: every component sharing one bus and one REST adapter.
pub struct DeskContext {
    config: DeskConfig,
    bus: Arc<EventBus>,
    http: Option<Arc<HttpRestClient>>,
    tickets: Arc<TicketClient>,
    claims: Arc<ClaimCoordinator>,
    reminders: Arc<ReminderNotifier>,
}

impl DeskContext {
    /// Builds a context talking HTTP to the configured services.
    pub fn from_config(config: DeskConfig) -> Result<Self, DeskError> {
        let bus = Arc::new(EventBus::new());
        let http = Arc::new(HttpRestClient::new(&config.services, Arc::clone(&bus))?);
        let rest: Arc<dyn RestAdapter> = http.clone();
        let mut context = Self::assemble(config, bus, rest);
        context.http = Some(http);
        Ok(context)
    }

    /// Builds a context over any REST adapter. No session is managed.
    pub fn with_rest(config: DeskConfig, rest: Arc<dyn RestAdapter>) -> Self {
        Self::assemble(config, Arc::new(EventBus::new()), rest)
    }

    fn assemble(config: DeskConfig, bus: Arc<EventBus>, rest: Arc<dyn RestAdapter>) -> Self {
        let tickets = Arc::new(TicketClient::new(Arc::clone(&rest)));
        let ticket_service: Arc<dyn TicketService> = tickets.clone();
        let claims = Arc::new(ClaimCoordinator::new(
            Arc::clone(&rest),
            ticket_service,
            Arc::clone(&bus),
            AgentId(config.agent.id.clone()),
            config.claims.clone(),
        ));
        let reminders = ReminderNotifier::new(
            rest,
            Arc::clone(&bus),
            Duration::from_secs(config.reminders.refresh_interval_secs),
        );
        Self {
            config,
            bus,
            http: None,
            tickets,
            claims,
            reminders,
        }
    }

    /// Attaches the notifier and signs in with the configured token, if any.
    pub fn start(&self) {
        self.reminders.attach();
        if let (Some(http), Some(token)) = (&self.http, &self.config.agent.session_token) {
            http.sign_in(AgentId(self.config.agent.id.clone()), token.clone());
        }
        info!(agent = %self.config.agent.id, "desk started");
    }

    /// Detaches the notifier and drops every bus listener.
    ///
    /// Requests still in flight are not cancelled.
    pub fn shutdown(&self) {
        self.reminders.detach();
        self.bus.clear();
        info!("desk stopped");
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn http(&self) -> Option<&Arc<HttpRestClient>> {
        self.http.as_ref()
    }

    pub fn tickets(&self) -> &Arc<TicketClient> {
        &self.tickets
    }

    pub fn claims(&self) -> &Arc<ClaimCoordinator> {
        &self.claims
    }

    pub fn reminders(&self) -> &Arc<ReminderNotifier> {
        &self.reminders
    }
}

// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the backend services.
//!
//! Provides [`HttpRestClient`], which maps the four REST verbs onto HTTP
//! methods against `{service base url}/{noun}`, decodes response envelopes,
//! publishes envelope warnings, and tears the session down when the backend
//! reports it expired.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use claimdesk_bus::{DeskEvent, EventBus};
use claimdesk_config::ServicesConfig;
use claimdesk_core::error::codes;
use claimdesk_core::types::service;
use claimdesk_core::{AgentId, DeskError, Envelope, RestAdapter, RestMethod};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::session::Session;

/// HTTP implementation of [`RestAdapter`].
pub struct HttpRestClient {
    client: reqwest::Client,
    services: HashMap<String, String>,
    session: Session,
    bus: Arc<EventBus>,
}

impl HttpRestClient {
    /// Creates a client for the services named in `config`.
    pub fn new(config: &ServicesConfig, bus: Arc<EventBus>) -> Result<Self, DeskError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| DeskError::Network {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let services = [
            (service::MONOLITH, &config.monolith_url),
            (service::TICKETS, &config.tickets_url),
            (service::TELEPHONY, &config.telephony_url),
            (service::EMAIL, &config.email_url),
            (service::CRM, &config.crm_url),
        ]
        .into_iter()
        .map(|(name, url)| (name.to_string(), url.trim_end_matches('/').to_string()))
        .collect();

        Ok(Self {
            client,
            services,
            session: Session::new(),
            bus,
        })
    }

    /// Overrides (or adds) the base URL of one service.
    pub fn with_service_url(mut self, service: &str, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.services
            .insert(service.to_string(), url.trim_end_matches('/').to_string());
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Starts a session and publishes `signedIn`.
    pub fn sign_in(&self, agent: AgentId, token: String) {
        info!(agent = %agent, "agent signed in");
        self.session.begin(agent.clone(), token);
        self.bus.trigger(DeskEvent::SignedIn { agent });
    }

    /// Ends the session and publishes `signedOut`.
    pub fn sign_out(&self) {
        if let Some(state) = self.session.end() {
            info!(agent = %state.agent, "agent signed out");
        }
        self.bus.trigger(DeskEvent::SignedOut);
    }

    /// Clears an expired session. Publishes `signedOut` only if one was active.
    fn expire_session(&self) {
        if let Some(state) = self.session.end() {
            warn!(agent = %state.agent, "session expired, signing out");
            self.bus.trigger(DeskEvent::SignedOut);
        }
    }

    fn endpoint(&self, service: &str, noun: &str) -> Result<String, DeskError> {
        let base = self
            .services
            .get(service)
            .ok_or_else(|| DeskError::Config(format!("no base URL configured for service `{service}`")))?;
        Ok(format!("{base}/{}", noun.trim_start_matches('/')))
    }
}

#[async_trait]
impl RestAdapter for HttpRestClient {
    async fn call(
        &self,
        method: RestMethod,
        service: &str,
        noun: &str,
        data: Value,
    ) -> Result<Envelope, DeskError> {
        let url = self.endpoint(service, noun)?;
        let mut request = match method {
            RestMethod::Create => self.client.post(&url).json(&data),
            RestMethod::Read => self.client.get(&url).query(&query_pairs(&data)),
            RestMethod::Update => self.client.put(&url).json(&data),
            RestMethod::Delete => self.client.delete(&url).json(&data),
        };
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| DeskError::Network {
            message: format!("{method} {service}/{noun} failed: {e}"),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        debug!(%method, service, noun, status = %status, "response received");

        if status == StatusCode::UNAUTHORIZED {
            self.expire_session();
            return Err(DeskError::SessionExpired);
        }

        let body = response.text().await.map_err(|e| DeskError::Network {
            message: format!("failed to read {service}/{noun} response: {e}"),
            source: Some(Box::new(e)),
        })?;

        let mut envelope = match decode_envelope(&body) {
            Some(envelope) => envelope,
            None if status.is_success() => {
                return Err(DeskError::network(format!(
                    "{service}/{noun} returned a malformed envelope"
                )));
            }
            None => {
                return Err(DeskError::network(format!(
                    "{service}/{noun} returned {status}: {body}"
                )));
            }
        };

        if !status.is_success() && envelope.error.is_none() {
            return Err(DeskError::network(format!(
                "{service}/{noun} returned {status}"
            )));
        }

        if let Some(fault) = &envelope.error {
            debug!(code = fault.code, service, noun, "backend reported an error");
            if fault.code == codes::SESSION_EXPIRED {
                self.expire_session();
            }
        }

        if let Some(warning) = &envelope.warning {
            let text = match warning {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            warn!(service, noun, warning = %text, "backend warning");
            self.bus.trigger(DeskEvent::Warning(text));
            envelope.handled = true;
        }

        Ok(envelope)
    }
}

/// Decodes a body into an envelope. An empty body is an empty success.
fn decode_envelope(body: &str) -> Option<Envelope> {
    if body.trim().is_empty() {
        return Some(Envelope::default());
    }
    serde_json::from_str(body).ok()
}

/// Flattens a JSON object into query parameters for reads.
fn query_pairs(data: &Value) -> Vec<(String, String)> {
    match data {
        Value::Null => Vec::new(),
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| {
                let value = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), value)
            })
            .collect(),
        other => vec![("q".to_string(), other.to_string())],
    }
}

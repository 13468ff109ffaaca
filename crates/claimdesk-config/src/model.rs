// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for claimdesk.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level claimdesk configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeskConfig {
    /// Agent identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Backend service endpoints.
    #[serde(default)]
    pub services: ServicesConfig,

    /// Claim lifecycle settings.
    #[serde(default)]
    pub claims: ClaimsConfig,

    /// Reminder count polling.
    #[serde(default)]
    pub reminders: RemindersConfig,
}

/// Agent identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Identity of the signed-in agent.
    #[serde(default = "default_agent_id")]
    pub id: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Session token sent as a bearer credential. `None` starts signed out.
    #[serde(default)]
    pub session_token: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            id: default_agent_id(),
            log_level: default_log_level(),
            session_token: None,
        }
    }
}

fn default_agent_id() -> String {
    "agent".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Base URLs of the backend services.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServicesConfig {
    #[serde(default = "default_monolith_url")]
    pub monolith_url: String,

    #[serde(default = "default_tickets_url")]
    pub tickets_url: String,

    #[serde(default = "default_telephony_url")]
    pub telephony_url: String,

    #[serde(default = "default_email_url")]
    pub email_url: String,

    #[serde(default = "default_crm_url")]
    pub crm_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            monolith_url: default_monolith_url(),
            tickets_url: default_tickets_url(),
            telephony_url: default_telephony_url(),
            email_url: default_email_url(),
            crm_url: default_crm_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_monolith_url() -> String {
    "http://127.0.0.1:8080/api".to_string()
}

fn default_tickets_url() -> String {
    "http://127.0.0.1:8081/api".to_string()
}

fn default_telephony_url() -> String {
    "http://127.0.0.1:8082/api".to_string()
}

fn default_email_url() -> String {
    "http://127.0.0.1:8083/api".to_string()
}

fn default_crm_url() -> String {
    "http://127.0.0.1:8084/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Claim lifecycle configuration.
///
/// Sub-type and action names are resolved to ids by the ticket service at
/// runtime, so they must match the ticketing backend's catalog.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClaimsConfig {
    /// Allow claims without a backing ticket (transitional compatibility).
    #[serde(default)]
    pub legacy_no_ticket: bool,

    #[serde(default = "default_continuous_cancel_subtype")]
    pub continuous_cancel_subtype: String,

    #[serde(default = "default_qa_decline_subtype")]
    pub qa_decline_subtype: String,

    #[serde(default = "default_provider_return_subtype")]
    pub provider_return_subtype: String,

    #[serde(default = "default_provider_transfer_subtype")]
    pub provider_transfer_subtype: String,

    /// Sub-type of the ticket opened when a medication switch is re-claimed.
    #[serde(default = "default_medication_switch_subtype")]
    pub medication_switch_subtype: String,

    #[serde(default = "default_escalation_action")]
    pub escalation_action: String,

    #[serde(default = "default_escalation_action_type")]
    pub escalation_action_type: String,
}

impl Default for ClaimsConfig {
    fn default() -> Self {
        Self {
            legacy_no_ticket: false,
            continuous_cancel_subtype: default_continuous_cancel_subtype(),
            qa_decline_subtype: default_qa_decline_subtype(),
            provider_return_subtype: default_provider_return_subtype(),
            provider_transfer_subtype: default_provider_transfer_subtype(),
            medication_switch_subtype: default_medication_switch_subtype(),
            escalation_action: default_escalation_action(),
            escalation_action_type: default_escalation_action_type(),
        }
    }
}

fn default_continuous_cancel_subtype() -> String {
    "Recurring Purchase Canceled".to_string()
}

fn default_qa_decline_subtype() -> String {
    "QA Order Declined".to_string()
}

fn default_provider_return_subtype() -> String {
    "Provider Return".to_string()
}

fn default_provider_transfer_subtype() -> String {
    "Provider Transfer".to_string()
}

fn default_medication_switch_subtype() -> String {
    "Medication Switch".to_string()
}

fn default_escalation_action() -> String {
    "Escalated".to_string()
}

fn default_escalation_action_type() -> String {
    "Escalation".to_string()
}

/// Reminder count polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RemindersConfig {
    /// Seconds between unresolved-count refreshes.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

fn default_refresh_interval_secs() -> u64 {
    3600
}

// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as URL schemes and positive intervals.

use crate::diagnostic::ConfigError;
use crate::model::DeskConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &DeskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.agent.id.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "agent.id must not be empty".to_string(),
        });
    }

    let services = &config.services;
    for (key, url) in [
        ("monolith_url", &services.monolith_url),
        ("tickets_url", &services.tickets_url),
        ("telephony_url", &services.telephony_url),
        ("email_url", &services.email_url),
        ("crm_url", &services.crm_url),
    ] {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ConfigError::Validation {
                message: format!("services.{key} `{url}` must be an http:// or https:// URL"),
            });
        }
    }

    if services.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "services.request_timeout_secs must be greater than 0".to_string(),
        });
    }

    if config.reminders.refresh_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "reminders.refresh_interval_secs must be greater than 0".to_string(),
        });
    }

    let claims = &config.claims;
    for (key, value) in [
        ("continuous_cancel_subtype", &claims.continuous_cancel_subtype),
        ("qa_decline_subtype", &claims.qa_decline_subtype),
        ("provider_return_subtype", &claims.provider_return_subtype),
        ("provider_transfer_subtype", &claims.provider_transfer_subtype),
        ("medication_switch_subtype", &claims.medication_switch_subtype),
        ("escalation_action", &claims.escalation_action),
        ("escalation_action_type", &claims.escalation_action_type),
    ] {
        if value.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("claims.{key} must not be empty"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&DeskConfig::default()).is_ok());
    }

    #[test]
    fn non_http_url_fails_validation() {
        let mut config = DeskConfig::default();
        config.services.tickets_url = "ftp://tickets".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "services.tickets_url"));
    }

    #[test]
    fn zero_refresh_interval_fails_validation() {
        let mut config = DeskConfig::default();
        config.reminders.refresh_interval_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "refresh_interval_secs"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = DeskConfig::default();
        config.agent.id = "  ".to_string();
        config.services.request_timeout_secs = 0;
        config.claims.escalation_action = String::new();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(has_message(&errors, "agent.id"));
        assert!(has_message(&errors, "claims.escalation_action"));
    }
}

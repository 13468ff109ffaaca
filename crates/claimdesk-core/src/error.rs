// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error taxonomy shared by every claimdesk crate.
//!
//! Remote failures arrive as `{code, msg}` pairs inside a response envelope;
//! [`DeskError::from_fault`] maps the codes the coordinator depends on to
//! dedicated variants and everything else to [`DeskError::Remote`].

use serde_json::Value;
use thiserror::Error;

/// Backend error codes with dedicated handling.
pub mod codes {
    /// The session token is no longer valid.
    pub const SESSION_EXPIRED: i64 = 102;
    /// Field validation failed; the message is a nested error tree.
    pub const FIELD_VALIDATION: i64 = 1001;
    /// Another agent already holds a claim on this phone number.
    pub const DUPLICATE_CLAIM: i64 = 1101;
    /// The domain action could not be synced to the external CRM.
    pub const UPSTREAM_SYNC: i64 = 1103;
    /// The claim being modified no longer exists.
    pub const CLAIM_NOT_FOUND: i64 = 1104;
}

/// One flattened entry of a field-validation error tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFault {
    /// Dotted path of the offending field (`customer.phone`).
    pub field: String,
    /// Message reported for that field.
    pub message: String,
}

/// The primary error type used across the claimdesk workspace.
#[derive(Debug, Error)]
pub enum DeskError {
    /// A local precondition failed before any network call was made.
    #[error("validation error: {0}")]
    Validation(String),

    /// The backend rejected a claim because the customer is already claimed (1101).
    #[error("customer has already been claimed")]
    DuplicateClaim,

    /// The claim targeted by a transfer or release no longer exists (1104).
    #[error("claim no longer exists")]
    ClaimNotFound,

    /// The domain action failed in the external CRM (1103).
    #[error("upstream CRM sync failed: {message}")]
    UpstreamSync { message: String },

    /// The backend rejected one or more fields (1001).
    #[error("field validation failed: {}", render_fields(fields))]
    FieldValidation { fields: Vec<FieldFault> },

    /// The session expired or was revoked (102 / HTTP 401).
    #[error("session expired")]
    SessionExpired,

    /// Any other server error code.
    #[error("remote error {code}: {message}")]
    Remote { code: i64, message: String },

    /// The request never produced a usable response.
    #[error("network failure: {message}")]
    Network {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DeskError {
    /// Builds the error for a remote `{code, msg}` fault.
    pub fn from_fault(code: i64, msg: &Value) -> Self {
        match code {
            codes::DUPLICATE_CLAIM => Self::DuplicateClaim,
            codes::CLAIM_NOT_FOUND => Self::ClaimNotFound,
            codes::UPSTREAM_SYNC => Self::UpstreamSync {
                message: message_text(msg),
            },
            codes::FIELD_VALIDATION => Self::FieldValidation {
                fields: flatten_fields(msg),
            },
            codes::SESSION_EXPIRED => Self::SessionExpired,
            _ => Self::Remote {
                code,
                message: message_text(msg),
            },
        }
    }

    /// Shorthand for a transport failure without an underlying source.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// The backend error code this error was mapped from, if any.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::DuplicateClaim => Some(codes::DUPLICATE_CLAIM),
            Self::ClaimNotFound => Some(codes::CLAIM_NOT_FOUND),
            Self::UpstreamSync { .. } => Some(codes::UPSTREAM_SYNC),
            Self::FieldValidation { .. } => Some(codes::FIELD_VALIDATION),
            Self::SessionExpired => Some(codes::SESSION_EXPIRED),
            Self::Remote { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Human-readable text published on the `error` topic.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::DuplicateClaim => "Customer has already been claimed".to_string(),
            Self::ClaimNotFound => "Claim no longer exists".to_string(),
            Self::UpstreamSync { message } => format!("CRM sync failed: {message}"),
            Self::FieldValidation { fields } => render_fields(fields),
            Self::SessionExpired => "Your session has expired, please sign in again".to_string(),
            Self::Remote { message, .. } => message.clone(),
            Self::Network { message, .. } => format!("Network error: {message}"),
            Self::Config(_) | Self::Internal(_) => self.to_string(),
        }
    }
}

/// Renders a fault message that may be a string or arbitrary JSON.
fn message_text(msg: &Value) -> String {
    match msg {
        Value::String(s) => s.clone(),
        Value::Null => "unknown error".to_string(),
        other => other.to_string(),
    }
}

/// Flattens a nested `{field: message | [messages] | {..}}` tree.
fn flatten_fields(msg: &Value) -> Vec<FieldFault> {
    let mut out = Vec::new();
    collect_fields("", msg, &mut out);
    out
}

fn collect_fields(prefix: &str, value: &Value, out: &mut Vec<FieldFault>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                collect_fields(&path, child, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_fields(prefix, item, out);
            }
        }
        Value::Null => {}
        other => out.push(FieldFault {
            field: prefix.to_string(),
            message: message_text(other),
        }),
    }
}

fn render_fields(fields: &[FieldFault]) -> String {
    fields
        .iter()
        .map(|f| {
            if f.field.is_empty() {
                f.message.clone()
            } else {
                format!("{}: {}", f.field, f.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

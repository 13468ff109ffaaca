// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the coordinator, the ticket client and the notifier.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::error::DeskError;

/// Backend service names understood by the REST layer.
pub mod service {
    pub const MONOLITH: &str = "monolith";
    pub const TICKETS: &str = "tickets";
    pub const TELEPHONY: &str = "telephony";
    pub const EMAIL: &str = "email";
    pub const CRM: &str = "crm";
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Reads an identifier that the backend may send as a string or a number.
            pub fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
                    Value::Number(n) => Some(Self(n.to_string())),
                    _ => None,
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Identity of a support agent.
    AgentId
);
string_id!(
    /// Identifier of a support ticket.
    TicketId
);
string_id!(
    /// Identifier of a claim record.
    ClaimId
);
string_id!(
    /// Identifier of a customer in the monolith.
    CustomerId
);

/// Numeric ticket sub-type (reason code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubtypeId(pub i64);

/// Numeric ticket action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionTypeId(pub i64);

/// A normalized customer phone number, the natural key of a claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Normalizes a user-entered phone number to `+<digits>`.
    ///
    /// Accepts 10-digit NANP numbers, 11-digit numbers with a leading `1`, and
    /// `+`-prefixed numbers of 8 to 15 digits. Spaces, dashes, dots and
    /// parentheses are ignored.
    pub fn parse(raw: &str) -> Result<Self, DeskError> {
        let trimmed = raw.trim();
        let (international, rest) = match trimmed.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let mut digits = String::with_capacity(rest.len());
        for c in rest.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' | '.' | '(' | ')' => {}
                _ => {
                    return Err(DeskError::Validation(format!(
                        "Phone number `{trimmed}` contains an invalid character"
                    )));
                }
            }
        }

        let normalized = match (international, digits.len()) {
            (true, 8..=15) => format!("+{digits}"),
            (false, 10) => format!("+1{digits}"),
            (false, 11) if digits.starts_with('1') => format!("+{digits}"),
            _ => {
                return Err(DeskError::Validation(format!(
                    "Phone number `{trimmed}` is not a valid number"
                )));
            }
        };
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Customer reference data carried alongside a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub phone: Phone,
    pub id: Option<CustomerId>,
    pub name: Option<String>,
}

impl Customer {
    pub fn new(phone: Phone) -> Self {
        Self {
            phone,
            id: None,
            name: None,
        }
    }

    pub fn with_id(mut self, id: CustomerId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Why a claim exists: the order or interaction that triggered it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimContext {
    pub order_id: Option<String>,
    pub continuous: bool,
    pub provider: Option<String>,
}

impl ClaimContext {
    /// A regular, non-continuous context with no order attached.
    pub fn regular() -> Self {
        Self::default()
    }

    /// Context for working a continuous (recurring) order.
    pub fn continuous(order_id: impl Into<String>) -> Self {
        Self {
            order_id: Some(order_id.into()),
            continuous: true,
            provider: None,
        }
    }
}

/// One agent's exclusive working ownership of one customer conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub customer_phone: Phone,
    pub customer_id: Option<CustomerId>,
    pub customer_name: Option<String>,
    pub ticket_id: Option<TicketId>,
    pub claimed_by: AgentId,
    pub order_id: Option<String>,
    pub continuous: bool,
    pub provider: Option<String>,
}

/// A claim currently being worked, as known to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveClaim {
    pub customer: Customer,
    pub ticket_id: Option<TicketId>,
}

impl From<&Claim> for ActiveClaim {
    fn from(claim: &Claim) -> Self {
        Self {
            customer: Customer {
                phone: claim.customer_phone.clone(),
                id: claim.customer_id.clone(),
                name: claim.customer_name.clone(),
            },
            ticket_id: claim.ticket_id.clone(),
        }
    }
}

/// Kind of item appended to a ticket.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Note,
    Order,
    Call,
    Sms,
    Email,
}

/// An item (note, order reference, communication) on a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketItem {
    pub kind: ItemKind,
    pub value: String,
}

impl TicketItem {
    pub fn note(text: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Note,
            value: text.into(),
        }
    }

    pub fn order(order_id: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Order,
            value: order_id.into(),
        }
    }
}

/// REST verb of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum RestMethod {
    Create,
    Read,
    Update,
    Delete,
}

/// Error half of a response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteFault {
    pub code: i64,
    #[serde(default)]
    pub msg: Value,
}

/// The `{data, error, warning, _handled}` envelope every backend call returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RemoteFault>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<Value>,
    #[serde(default, rename = "_handled")]
    pub handled: bool,
}

impl Envelope {
    pub fn ok(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    pub fn fault(code: i64, msg: impl Into<Value>) -> Self {
        Self {
            error: Some(RemoteFault {
                code,
                msg: msg.into(),
            }),
            ..Self::default()
        }
    }

    /// Converts the envelope into its data payload or the mapped error.
    pub fn into_result(self) -> Result<Value, DeskError> {
        match self.error {
            Some(fault) => Err(DeskError::from_fault(fault.code, &fault.msg)),
            None => Ok(self.data.unwrap_or(Value::Null)),
        }
    }
}

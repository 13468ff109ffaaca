// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for claimdesk.
//!
//! This crate provides the error taxonomy, the domain types (claims, ticket
//! items, response envelopes) and the adapter traits that the coordinator,
//! ticket client and reminder notifier are written against.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{DeskError, FieldFault};
pub use traits::{RestAdapter, TicketService};
pub use types::{
    ActionTypeId, ActiveClaim, AgentId, Claim, ClaimContext, ClaimId, Customer, CustomerId,
    Envelope, ItemKind, Phone, RemoteFault, RestMethod, SubtypeId, TicketId, TicketItem,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_adapter_traits_are_exported() {
        fn _assert_rest<T: RestAdapter>() {}
        fn _assert_tickets<T: TicketService>() {}
    }

    #[test]
    fn desk_error_has_all_variants() {
        let _validation = DeskError::Validation("test".into());
        let _duplicate = DeskError::DuplicateClaim;
        let _missing = DeskError::ClaimNotFound;
        let _sync = DeskError::UpstreamSync {
            message: "test".into(),
        };
        let _fields = DeskError::FieldValidation { fields: vec![] };
        let _expired = DeskError::SessionExpired;
        let _remote = DeskError::Remote {
            code: 1,
            message: "test".into(),
        };
        let _network = DeskError::Network {
            message: "test".into(),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
        let _config = DeskError::Config("test".into());
        let _internal = DeskError::Internal("test".into());
    }

    #[test]
    fn active_claim_from_claim_keeps_identity() {
        let claim = Claim {
            id: ClaimId("C1".into()),
            customer_phone: Phone::parse("5551234567").unwrap(),
            customer_id: Some(CustomerId("cust-9".into())),
            customer_name: Some("Ada".into()),
            ticket_id: Some(TicketId("T1".into())),
            claimed_by: AgentId("agent42".into()),
            order_id: None,
            continuous: false,
            provider: None,
        };
        let active = ActiveClaim::from(&claim);
        assert_eq!(active.customer.phone, claim.customer_phone);
        assert_eq!(active.ticket_id, claim.ticket_id);
        assert_eq!(active.customer.name.as_deref(), Some("Ada"));
    }
}

// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket service trait.

use async_trait::async_trait;

use crate::error::DeskError;
use crate::types::{ActionTypeId, CustomerId, Phone, SubtypeId, TicketId, TicketItem};

/// Creates, annotates, resolves and deletes support tickets.
///
/// Sub-types and action types are addressed by their human-readable names;
/// implementations resolve them to numeric ids.
#[async_trait]
pub trait TicketService: Send + Sync + 'static {
    /// Whether the customer has an open ticket.
    async fn exists(&self, customer_id: &CustomerId) -> Result<bool, DeskError>;

    /// Opens a ticket and returns its id.
    async fn create(
        &self,
        phone: &Phone,
        customer_id: Option<&CustomerId>,
        subtype: &str,
        items: &[TicketItem],
    ) -> Result<TicketId, DeskError>;

    /// Appends an item to an open ticket.
    async fn item(&self, item: &TicketItem, ticket_id: &TicketId) -> Result<(), DeskError>;

    /// Records an action of the named type on the ticket.
    async fn action(
        &self,
        action_name: &str,
        action_type: &str,
        ticket_id: &TicketId,
    ) -> Result<(), DeskError>;

    /// Moves the ticket to its terminal resolved state.
    async fn resolve(&self, subtype: SubtypeId, ticket_id: &TicketId) -> Result<(), DeskError>;

    /// Deletes a ticket. Used to compensate a failed claim.
    async fn delete(&self, ticket_id: &TicketId) -> Result<(), DeskError>;

    /// Resolves a sub-type name to its id.
    async fn subtype_id(&self, name: &str) -> Result<SubtypeId, DeskError>;

    /// Resolves an action-type name to its id.
    async fn action_type_id(&self, name: &str) -> Result<ActionTypeId, DeskError>;
}

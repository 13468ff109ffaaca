// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`TicketService`] implementation over the REST adapter.

use std::sync::Arc;

use async_trait::async_trait;
use claimdesk_core::types::service;
use claimdesk_core::{
    ActionTypeId, CustomerId, DeskError, Phone, RestAdapter, RestMethod, SubtypeId, TicketId,
    TicketItem, TicketService,
};
use serde_json::{Value, json};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::catalog::Catalog;

/// Nouns exposed by the ticket service.
pub mod nouns {
    pub const TICKET: &str = "ticket";
    pub const TICKET_EXISTS: &str = "ticket_exists";
    pub const ITEM: &str = "item";
    pub const ACTION: &str = "action";
    pub const RESOLVE: &str = "resolve";
    pub const SUBTYPES: &str = "subtypes";
    pub const ACTION_TYPES: &str = "action_types";
}

/// Ticket service client.
///
/// Sub-type and action-type catalogs are fetched on first use and cached for
/// the lifetime of the client. A failed fetch is not cached.
pub struct TicketClient {
    rest: Arc<dyn RestAdapter>,
    subtypes: OnceCell<Catalog>,
    action_types: OnceCell<Catalog>,
}

impl TicketClient {
    pub fn new(rest: Arc<dyn RestAdapter>) -> Self {
        Self {
            rest,
            subtypes: OnceCell::new(),
            action_types: OnceCell::new(),
        }
    }

    async fn send(&self, method: RestMethod, noun: &str, data: Value) -> Result<Value, DeskError> {
        self.rest
            .call(method, service::TICKETS, noun, data)
            .await?
            .into_result()
    }

    async fn catalog<'a>(
        &'a self,
        cell: &'a OnceCell<Catalog>,
        noun: &'static str,
    ) -> Result<&'a Catalog, DeskError> {
        cell.get_or_try_init(|| async move {
            let data = self.send(RestMethod::Read, noun, Value::Null).await?;
            let catalog = Catalog::parse(noun, data)?;
            debug!(noun, entries = catalog.len(), "ticket catalog loaded");
            Ok(catalog)
        })
        .await
    }
}

#[async_trait]
impl TicketService for TicketClient {
    async fn exists(&self, customer_id: &CustomerId) -> Result<bool, DeskError> {
        let data = self
            .send(
                RestMethod::Read,
                nouns::TICKET_EXISTS,
                json!({ "customerId": customer_id }),
            )
            .await?;
        match data {
            Value::Bool(exists) => Ok(exists),
            Value::Object(ref map) => Ok(map.get("exists").and_then(Value::as_bool).unwrap_or(false)),
            Value::Null => Ok(false),
            other => Err(DeskError::Internal(format!(
                "unexpected ticket existence payload: {other}"
            ))),
        }
    }

    async fn create(
        &self,
        phone: &Phone,
        customer_id: Option<&CustomerId>,
        subtype: &str,
        items: &[TicketItem],
    ) -> Result<TicketId, DeskError> {
        let subtype_id = self.subtype_id(subtype).await?;
        let data = self
            .send(
                RestMethod::Create,
                nouns::TICKET,
                json!({
                    "phone": phone,
                    "customerId": customer_id,
                    "subTypeId": subtype_id.0,
                    "items": items,
                }),
            )
            .await?;

        let id = data
            .get("id")
            .and_then(TicketId::from_value)
            .or_else(|| TicketId::from_value(&data))
            .ok_or_else(|| DeskError::Internal("ticket create response carried no id".into()))?;
        info!(ticket_id = %id, phone = %phone, subtype, "ticket created");
        Ok(id)
    }

    async fn item(&self, item: &TicketItem, ticket_id: &TicketId) -> Result<(), DeskError> {
        self.send(
            RestMethod::Create,
            nouns::ITEM,
            json!({ "ticketId": ticket_id, "kind": item.kind, "value": item.value }),
        )
        .await?;
        debug!(ticket_id = %ticket_id, kind = %item.kind, "ticket item appended");
        Ok(())
    }

    async fn action(
        &self,
        action_name: &str,
        action_type: &str,
        ticket_id: &TicketId,
    ) -> Result<(), DeskError> {
        let action_type_id = self.action_type_id(action_type).await?;
        self.send(
            RestMethod::Create,
            nouns::ACTION,
            json!({
                "ticketId": ticket_id,
                "action": action_name,
                "actionTypeId": action_type_id.0,
            }),
        )
        .await?;
        debug!(ticket_id = %ticket_id, action = action_name, "ticket action recorded");
        Ok(())
    }

    async fn resolve(&self, subtype: SubtypeId, ticket_id: &TicketId) -> Result<(), DeskError> {
        self.send(
            RestMethod::Update,
            nouns::RESOLVE,
            json!({ "ticketId": ticket_id, "subTypeId": subtype.0 }),
        )
        .await?;
        info!(ticket_id = %ticket_id, subtype = subtype.0, "ticket resolved");
        Ok(())
    }

    async fn delete(&self, ticket_id: &TicketId) -> Result<(), DeskError> {
        self.send(
            RestMethod::Delete,
            nouns::TICKET,
            json!({ "ticketId": ticket_id }),
        )
        .await?;
        info!(ticket_id = %ticket_id, "ticket deleted");
        Ok(())
    }

    async fn subtype_id(&self, name: &str) -> Result<SubtypeId, DeskError> {
        self.catalog(&self.subtypes, nouns::SUBTYPES)
            .await?
            .lookup(name)
            .map(SubtypeId)
            .ok_or_else(|| DeskError::Validation(format!("Unknown ticket sub-type `{name}`")))
    }

    async fn action_type_id(&self, name: &str) -> Result<ActionTypeId, DeskError> {
        self.catalog(&self.action_types, nouns::ACTION_TYPES)
            .await?
            .lookup(name)
            .map(ActionTypeId)
            .ok_or_else(|| DeskError::Validation(format!("Unknown ticket action type `{name}`")))
    }
}

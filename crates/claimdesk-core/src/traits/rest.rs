// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST adapter trait for the backend services.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::DeskError;
use crate::types::{Envelope, RestMethod};

/// Request/response access to the named backend services.
///
/// `Err` is reserved for calls that never produced an envelope (transport
/// failure, expired session). Backend-reported errors come back inside
/// `Ok(Envelope)` and are mapped with [`Envelope::into_result`].
#[async_trait]
pub trait RestAdapter: Send + Sync + 'static {
    /// Issues one request against `service`/`noun`.
    async fn call(
        &self,
        method: RestMethod,
        service: &str,
        noun: &str,
        data: Value,
    ) -> Result<Envelope, DeskError>;

    async fn create(&self, service: &str, noun: &str, data: Value) -> Result<Envelope, DeskError> {
        self.call(RestMethod::Create, service, noun, data).await
    }

    async fn read(&self, service: &str, noun: &str, data: Value) -> Result<Envelope, DeskError> {
        self.call(RestMethod::Read, service, noun, data).await
    }

    async fn update(&self, service: &str, noun: &str, data: Value) -> Result<Envelope, DeskError> {
        self.call(RestMethod::Update, service, noun, data).await
    }

    async fn delete(&self, service: &str, noun: &str, data: Value) -> Result<Envelope, DeskError> {
        self.call(RestMethod::Delete, service, noun, data).await
    }
}

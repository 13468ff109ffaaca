// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for claimdesk integration tests.
//!
//! Provides a scripted REST backend and test harness infrastructure for fast,
//! deterministic tests without running services.
//!
//! # Components
//!
//! - [`MockRest`] - REST adapter with queued envelopes and call recording
//! - [`EventRecorder`] - Captures everything published on an event bus
//! - [`TestHarness`] - Coordinator, ticket client and notifier over one mock

pub mod harness;
pub mod mock_rest;
pub mod recorder;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_rest::{Gate, MockRest, RecordedCall};
pub use recorder::EventRecorder;

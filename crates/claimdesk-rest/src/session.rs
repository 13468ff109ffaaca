// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signed-in agent session.

use claimdesk_core::AgentId;
use parking_lot::RwLock;

/// Credentials of the signed-in agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub agent: AgentId,
    pub token: String,
}

/// Holds the current session, if any.
#[derive(Debug, Default)]
pub struct Session {
    state: RwLock<Option<SessionState>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current session.
    pub fn begin(&self, agent: AgentId, token: String) {
        *self.state.write() = Some(SessionState { agent, token });
    }

    /// Clears the session and returns what was held.
    pub fn end(&self) -> Option<SessionState> {
        self.state.write().take()
    }

    pub fn token(&self) -> Option<String> {
        self.state.read().as_ref().map(|s| s.token.clone())
    }

    pub fn agent(&self) -> Option<AgentId> {
        self.state.read().as_ref().map(|s| s.agent.clone())
    }

    pub fn is_active(&self) -> bool {
        self.state.read().is_some()
    }
}

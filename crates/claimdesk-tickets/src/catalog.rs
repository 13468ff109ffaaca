// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Name-to-id catalogs published by the ticket service.

use std::collections::HashMap;

use claimdesk_core::DeskError;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    id: i64,
    name: String,
}

/// Lookup table from a human-readable name to its numeric id.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    by_name: HashMap<String, i64>,
}

impl Catalog {
    /// Parses a `[{id, name}, ...]` listing.
    pub fn parse(kind: &str, data: Value) -> Result<Self, DeskError> {
        let entries: Vec<CatalogEntry> = serde_json::from_value(data)
            .map_err(|e| DeskError::Internal(format!("malformed {kind} catalog: {e}")))?;
        let by_name = entries
            .into_iter()
            .map(|entry| (entry.name.trim().to_string(), entry.id))
            .collect();
        Ok(Self { by_name })
    }

    pub fn lookup(&self, name: &str) -> Option<i64> {
        self.by_name.get(name.trim()).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

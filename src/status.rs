//! Runtime connection status, overlaid on the catalog's initial status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::ConnectionStatus;
use crate::expansion::NodeKey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: ConnectionStatus,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusBoard {
    entries: BTreeMap<NodeKey, StatusEntry>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: NodeKey, status: ConnectionStatus) {
        self.entries.insert(
            key,
            StatusEntry {
                status,
                changed_at: Utc::now(),
            },
        );
    }

    pub fn get(&self, key: &NodeKey) -> Option<&StatusEntry> {
        self.entries.get(key)
    }

    /// Status to show for `key`, falling back to what the catalog says
    pub fn effective(&self, key: &NodeKey, initial: ConnectionStatus) -> ConnectionStatus {
        self.entries
            .get(key)
            .map(|entry| entry.status)
            .unwrap_or(initial)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

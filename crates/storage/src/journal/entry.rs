// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Journal record structure with checksum verification
//!
//! Each record carries a sequence number, timestamp, one event and a CRC32
//! checksum of the serialized event.

use super::{JournalError, JournalKey};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A mutation of a store's live set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum JournalEvent<K> {
    /// Key inserted (or re-inserted) at the most-recent end
    Add(K),
    /// Key dropped from the live set
    Remove(K),
    /// Key moved to the most-recent end
    Touch(K),
}

impl<K> JournalEvent<K> {
    pub fn key(&self) -> &K {
        match self {
            JournalEvent::Add(k) | JournalEvent::Remove(k) | JournalEvent::Touch(k) => k,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            JournalEvent::Add(_) => "add",
            JournalEvent::Remove(_) => "remove",
            JournalEvent::Touch(_) => "touch",
        }
    }
}

/// A single line of the journal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry<K> {
    /// Monotonically increasing within one journal file
    pub sequence: u64,
    /// Microseconds since Unix epoch
    pub timestamp_micros: u64,
    pub event: JournalEvent<K>,
    /// CRC32 of the serialized event
    pub checksum: u32,
}

impl<K: JournalKey> JournalEntry<K> {
    /// Create a new entry with computed checksum
    pub fn new(sequence: u64, event: JournalEvent<K>) -> Result<Self, JournalError> {
        let timestamp_micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0);
        Self::new_with_timestamp(sequence, timestamp_micros, event)
    }

    /// Create a new entry with a specific timestamp (for testing)
    pub fn new_with_timestamp(
        sequence: u64,
        timestamp_micros: u64,
        event: JournalEvent<K>,
    ) -> Result<Self, JournalError> {
        let checksum = Self::calculate_checksum(&event)?;
        Ok(Self {
            sequence,
            timestamp_micros,
            event,
            checksum,
        })
    }

    fn calculate_checksum(event: &JournalEvent<K>) -> Result<u32, JournalError> {
        let json = serde_json::to_string(event)?;
        Ok(crc32fast::hash(json.as_bytes()))
    }

    /// Verify the checksum matches the event
    pub fn verify(&self) -> bool {
        matches!(Self::calculate_checksum(&self.event), Ok(sum) if sum == self.checksum)
    }

    /// Serialize to one line of JSON, without the trailing newline
    pub fn to_line(&self) -> Result<String, JournalError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_line(line: &str) -> Result<Self, JournalError> {
        Ok(serde_json::from_str(line)?)
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;

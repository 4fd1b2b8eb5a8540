// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Eviction strategies
//!
//! A strategy is a pure predicate over observable store state. The owning
//! store asks it after every insertion and evicts the least recently used
//! entry, one at a time, until the strategy is satisfied.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Observable state of a store, as seen by an eviction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreSnapshot {
    /// Number of live entries
    pub entries: usize,
    /// Total size of live entries in bytes
    pub bytes: u64,
}

/// Decides whether a store must shrink
pub trait EvictionStrategy: Debug + Send + Sync {
    fn should_evict(&self, store: &StoreSnapshot) -> bool;
}

/// Evict while the entry count exceeds a maximum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxCount(pub usize);

impl EvictionStrategy for MaxCount {
    fn should_evict(&self, store: &StoreSnapshot) -> bool {
        store.entries > self.0
    }
}

/// Evict while the total size exceeds a maximum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxBytes(pub u64);

impl EvictionStrategy for MaxBytes {
    fn should_evict(&self, store: &StoreSnapshot) -> bool {
        store.bytes > self.0
    }
}

/// Never evict
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unbounded;

impl EvictionStrategy for Unbounded {
    fn should_evict(&self, _store: &StoreSnapshot) -> bool {
        false
    }
}

/// Serializable choice of eviction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum EvictionPolicy {
    #[default]
    Unbounded,
    MaxCount {
        max_entries: usize,
    },
    MaxBytes {
        max_bytes: u64,
    },
}

impl EvictionPolicy {
    pub fn into_strategy(self) -> Box<dyn EvictionStrategy> {
        match self {
            EvictionPolicy::Unbounded => Box::new(Unbounded),
            EvictionPolicy::MaxCount { max_entries } => Box::new(MaxCount(max_entries)),
            EvictionPolicy::MaxBytes { max_bytes } => Box::new(MaxBytes(max_bytes)),
        }
    }
}

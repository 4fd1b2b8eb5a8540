// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store configuration

use crate::eviction::EvictionPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a journaled store lives and how it is bounded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub root: PathBuf,
    #[serde(default)]
    pub eviction: EvictionPolicy,
}

impl StoreConfig {
    /// Unbounded store at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            eviction: EvictionPolicy::default(),
        }
    }

    pub fn with_eviction(mut self, eviction: EvictionPolicy) -> Self {
        self.eviction = eviction;
        self
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ocs-storage: journaled staging and cache stores for OCFL content
//!
//! This crate provides:
//! - An append-only, checksummed journal that rebuilds LRU order on restart
//! - Pluggable eviction strategies
//! - A digest-addressed cache store
//! - Rolling, transactional and hybrid stores over versioned paths

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod cache;
pub mod channel;
pub mod config;
pub mod error;
pub mod eviction;
pub mod hybrid;
pub mod journal;
pub mod lru;
pub mod rolling;
pub mod store;
pub mod transactional;

mod index;
mod staged;
mod util;

pub use cache::{CacheEntryWriter, CacheStore};
pub use channel::{ByteWriter, CopyOptions, WriteOptions};
pub use config::StoreConfig;
pub use error::StoreError;
pub use eviction::{EvictionPolicy, EvictionStrategy, MaxBytes, MaxCount, StoreSnapshot, Unbounded};
pub use hybrid::HybridStore;
pub use journal::{
    CompactionResult, Journal, JournalEntry, JournalError, JournalEvent, JournalStats,
};
pub use lru::LruQueue;
pub use rolling::RollingStore;
pub use store::VersionedStore;
pub use transactional::{TransactionChange, TransactionalStore};

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Journaled LRU index shared by the cache and rolling stores
//!
//! Every mutation is appended to the journal before the in-memory state
//! changes. On open the replayed live set is reconciled against the files
//! on disk: entries whose file is missing are dropped with a journaled
//! `Remove`.

use crate::error::StoreError;
use crate::eviction::{EvictionStrategy, StoreSnapshot};
use crate::journal::{CompactionResult, Journal, JournalEvent, JournalKey, JournalStats};
use crate::lru::LruQueue;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

pub(crate) struct JournaledIndex<K> {
    journal: Journal<K>,
    lru: LruQueue<K>,
    sizes: HashMap<K, u64>,
    bytes: u64,
}

impl<K: JournalKey> JournaledIndex<K> {
    /// Replay the journal under `root`, keeping only keys whose file exists
    ///
    /// `locate` maps a key to its content file. Returns the index and the
    /// number of dangling entries dropped.
    pub(crate) fn open(
        root: &Path,
        locate: impl Fn(&K) -> PathBuf,
    ) -> Result<(Self, usize), StoreError> {
        let (journal, replay) = Journal::open(root)?;
        let mut index = Self {
            journal,
            lru: LruQueue::new(),
            sizes: HashMap::new(),
            bytes: 0,
        };

        let mut dangling = Vec::new();
        for key in replay.order.iter() {
            match std::fs::metadata(locate(key)) {
                Ok(meta) if meta.is_file() => {
                    index.lru.insert(key.clone());
                    index.sizes.insert(key.clone(), meta.len());
                    index.bytes += meta.len();
                }
                Ok(_) => dangling.push(key.clone()),
                Err(err) if err.kind() == io::ErrorKind::NotFound => dangling.push(key.clone()),
                Err(err) => return Err(err.into()),
            }
        }

        for key in &dangling {
            tracing::warn!(key = ?key, "journaled entry has no file; dropping");
            index.journal.append(JournalEvent::Remove(key.clone()))?;
        }

        Ok((index, dangling.len()))
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.lru.contains(key)
    }

    pub(crate) fn size(&self, key: &K) -> Option<u64> {
        self.sizes.get(key).copied()
    }

    pub(crate) fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            entries: self.lru.len(),
            bytes: self.bytes,
        }
    }

    /// Record `key` as most recently used with the given content size
    pub(crate) fn insert(&mut self, key: K, size: u64) -> Result<(), StoreError> {
        self.journal.append(JournalEvent::Add(key.clone()))?;
        self.lru.insert(key.clone());
        let previous = self.sizes.insert(key, size).unwrap_or(0);
        self.bytes = self.bytes - previous + size;
        Ok(())
    }

    /// Mark `key` most recently used; false if it is not live
    pub(crate) fn touch(&mut self, key: &K) -> Result<bool, StoreError> {
        if !self.lru.contains(key) {
            return Ok(false);
        }
        self.journal.append(JournalEvent::Touch(key.clone()))?;
        self.lru.touch(key);
        Ok(true)
    }

    /// Drop `key`; false if it was not live
    pub(crate) fn remove(&mut self, key: &K) -> Result<bool, StoreError> {
        if !self.lru.contains(key) {
            return Ok(false);
        }
        self.journal.append(JournalEvent::Remove(key.clone()))?;
        self.lru.remove(key);
        if let Some(size) = self.sizes.remove(key) {
            self.bytes -= size;
        }
        Ok(true)
    }

    /// Evict least recently used keys until `strategy` is satisfied
    ///
    /// `delete` is called for each victim after its `Remove` is journaled.
    pub(crate) fn evict(
        &mut self,
        strategy: &dyn EvictionStrategy,
        mut delete: impl FnMut(&K),
    ) -> Result<Vec<K>, StoreError> {
        let mut evicted = Vec::new();
        while strategy.should_evict(&self.snapshot()) {
            let Some(victim) = self.lru.oldest().cloned() else {
                break;
            };
            self.remove(&victim)?;
            delete(&victim);
            tracing::debug!(key = ?victim, "evicted");
            evicted.push(victim);
        }
        Ok(evicted)
    }

    /// Live keys, least recently used first
    pub(crate) fn keys(&self) -> Vec<K> {
        self.lru.iter().cloned().collect()
    }

    pub(crate) fn compact(&mut self) -> Result<CompactionResult, StoreError> {
        Ok(self.journal.compact(self.lru.iter())?)
    }

    pub(crate) fn journal_stats(&self) -> Result<JournalStats, StoreError> {
        Ok(self.journal.stats()?)
    }

    pub(crate) fn close(self) -> Result<(), StoreError> {
        Ok(self.journal.close()?)
    }
}

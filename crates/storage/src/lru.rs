// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recency-ordered key set

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Ordered set of keys, least recently used first
///
/// Every insert or touch stamps the key with a fresh tick; iteration walks
/// ticks in ascending order.
#[derive(Debug, Clone)]
pub struct LruQueue<K> {
    ticks: HashMap<K, u64>,
    order: BTreeMap<u64, K>,
    next_tick: u64,
}

impl<K: Clone + Eq + Hash> LruQueue<K> {
    pub fn new() -> Self {
        Self {
            ticks: HashMap::new(),
            order: BTreeMap::new(),
            next_tick: 0,
        }
    }

    /// Insert `key` at the most-recent end, moving it if already present
    ///
    /// Returns true if the key was newly inserted.
    pub fn insert(&mut self, key: K) -> bool {
        let tick = self.bump();
        let fresh = match self.ticks.insert(key.clone(), tick) {
            Some(old) => {
                self.order.remove(&old);
                false
            }
            None => true,
        };
        self.order.insert(tick, key);
        fresh
    }

    /// Move `key` to the most-recent end; no-op if absent
    pub fn touch(&mut self, key: &K) -> bool {
        if !self.ticks.contains_key(key) {
            return false;
        }
        let tick = self.bump();
        if let Some(old) = self.ticks.insert(key.clone(), tick) {
            self.order.remove(&old);
        }
        self.order.insert(tick, key.clone());
        true
    }

    /// Remove `key`; no-op if absent
    pub fn remove(&mut self, key: &K) -> bool {
        match self.ticks.remove(key) {
            Some(tick) => {
                self.order.remove(&tick);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.ticks.contains_key(key)
    }

    /// Least recently used key
    pub fn oldest(&self) -> Option<&K> {
        self.order.values().next()
    }

    /// Remove and return the least recently used key
    pub fn pop_oldest(&mut self) -> Option<K> {
        let (_, key) = self.order.pop_first()?;
        self.ticks.remove(&key);
        Some(key)
    }

    /// Keys from least to most recently used
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.order.values()
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    fn bump(&mut self) -> u64 {
        let tick = self.next_tick;
        self.next_tick += 1;
        tick
    }
}

impl<K: Clone + Eq + Hash> Default for LruQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Eq + Hash> FromIterator<K> for LruQueue<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut queue = Self::new();
        for key in iter {
            queue.insert(key);
        }
        queue
    }
}

#[cfg(test)]
#[path = "lru_tests.rs"]
mod tests;

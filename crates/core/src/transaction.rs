// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transaction context abstraction
//!
//! The storage layer never begins or ends transactions. It only asks
//! "which transaction, if any, is active for this caller?" through
//! [`TransactionContext`]. Whoever owns the transaction lifecycle updates
//! the context; stores read it on every call.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Ordinal of a transaction, strictly increasing over a process lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub u64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reports the transaction active for the current caller
pub trait TransactionContext: Send + Sync {
    fn active(&self) -> Option<TransactionId>;
}

impl TransactionContext for Option<TransactionId> {
    fn active(&self) -> Option<TransactionId> {
        *self
    }
}

impl<T: TransactionContext + ?Sized> TransactionContext for Arc<T> {
    fn active(&self) -> Option<TransactionId> {
        (**self).active()
    }
}

/// Context that never has an active transaction
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTransaction;

impl TransactionContext for NoTransaction {
    fn active(&self) -> Option<TransactionId> {
        None
    }
}

/// Hands out fresh transaction ordinals
///
/// Clones share the same counter.
#[derive(Debug, Clone)]
pub struct TransactionOrdinals {
    next: Arc<AtomicU64>,
}

impl TransactionOrdinals {
    /// Allocator whose first ordinal is 1
    pub fn new() -> Self {
        Self::starting_after(0)
    }

    /// Allocator whose first ordinal is `last + 1`
    ///
    /// Seed with the highest ordinal left on disk so a restarted process
    /// never reuses a leftover transaction directory.
    pub fn starting_after(last: u64) -> Self {
        Self {
            next: Arc::new(AtomicU64::new(last.saturating_add(1))),
        }
    }

    pub fn next(&self) -> TransactionId {
        TransactionId(self.next.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for TransactionOrdinals {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable, shareable transaction slot
///
/// The transaction manager calls [`begin`](Self::begin) and
/// [`end`](Self::end); stores holding a clone observe the change on their
/// next call.
#[derive(Debug, Clone, Default)]
pub struct SharedTransaction {
    current: Arc<Mutex<Option<TransactionId>>>,
}

impl SharedTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a transaction with a fresh ordinal from `ordinals`
    pub fn begin(&self, ordinals: &TransactionOrdinals) -> TransactionId {
        let id = ordinals.next();
        self.set(Some(id));
        id
    }

    /// Clear the active transaction, returning the one that was active
    pub fn end(&self) -> Option<TransactionId> {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        current.take()
    }

    /// Set the active transaction directly
    pub fn set(&self, id: Option<TransactionId>) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = id;
    }
}

impl TransactionContext for SharedTransaction {
    fn active(&self) -> Option<TransactionId> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for store operations

use crate::journal::JournalError;
use ocs_core::PathError;
use thiserror::Error;

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("no active transaction for {operation} on {target}")]
    InactiveTransaction {
        operation: &'static str,
        target: String,
    },
    #[error("journal error: {0}")]
    Journal(#[from] JournalError),
    #[error("invalid path: {0}")]
    Path(#[from] PathError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn not_found(target: impl ToString) -> Self {
        StoreError::NotFound(target.to_string())
    }

    pub(crate) fn already_exists(target: impl ToString) -> Self {
        StoreError::AlreadyExists(target.to_string())
    }

    pub(crate) fn inactive(operation: &'static str, target: impl ToString) -> Self {
        StoreError::InactiveTransaction {
            operation,
            target: target.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists(_))
    }

    pub fn is_inactive_transaction(&self) -> bool {
        matches!(self, StoreError::InactiveTransaction { .. })
    }
}

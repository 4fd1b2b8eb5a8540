// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hybrid store: transactional overlay on a rolling base
//!
//! Outside a transaction every operation goes straight to the rolling
//! store. Inside one, reads prefer whatever the transaction has touched:
//! its own copy, or a tombstone hiding the rolling copy. Writes, copies,
//! moves and deletes only ever change the transaction's overlay; the
//! rolling store is read but never modified.

use crate::channel::{ByteWriter, CopyOptions, WriteOptions};
use crate::error::StoreError;
use crate::rolling::RollingStore;
use crate::store::VersionedStore;
use crate::transactional::TransactionalStore;
use ocs_core::{TransactionContext, VersionedPath};
use std::fs::File;
use std::path::PathBuf;

pub struct HybridStore<T> {
    rolling: RollingStore,
    transactional: TransactionalStore<T>,
}

impl<T: TransactionContext> HybridStore<T> {
    pub fn new(rolling: RollingStore, transactional: TransactionalStore<T>) -> Self {
        Self {
            rolling,
            transactional,
        }
    }

    pub fn rolling(&self) -> &RollingStore {
        &self.rolling
    }

    pub fn transactional(&self) -> &TransactionalStore<T> {
        &self.transactional
    }

    /// Split back into the underlying stores
    pub fn into_parts(self) -> (RollingStore, TransactionalStore<T>) {
        (self.rolling, self.transactional)
    }

    fn in_transaction(&self) -> bool {
        self.transactional.active_transaction().is_some()
    }

    /// Where a read of `path` is served from right now
    fn resolve(&self, path: &VersionedPath) -> Result<Layer, StoreError> {
        if self.in_transaction() {
            if self.transactional.is_deleted(path) {
                return Ok(Layer::Hidden);
            }
            if self.transactional.exists(path)? {
                return Ok(Layer::Transactional);
            }
        }
        Ok(Layer::Rolling)
    }

    /// Validate a copy or move against the merged view
    ///
    /// Returns false when source and target are the same existing path.
    fn check_transfer(
        &self,
        source: &VersionedPath,
        target: &VersionedPath,
        options: CopyOptions,
    ) -> Result<bool, StoreError> {
        if !self.exists(source)? {
            return Err(StoreError::not_found(source));
        }
        if source == target {
            return Ok(false);
        }
        if !options.replace_existing && self.exists(target)? {
            return Err(StoreError::already_exists(target));
        }
        Ok(true)
    }

    /// Give the active transaction its own copy of a rolling-only path
    fn materialize(&self, path: &VersionedPath) -> Result<(), StoreError> {
        if let Layer::Rolling = self.resolve(path)? {
            let mut current = self.rolling.read_byte_channel(path)?;
            self.transactional
                .new_seeded_channel(path, &mut current)?
                .commit()?;
            tracing::debug!(%path, "copied into transaction");
        }
        Ok(())
    }
}

enum Layer {
    Rolling,
    Transactional,
    Hidden,
}

impl<T: TransactionContext> VersionedStore for HybridStore<T> {
    fn to_physical_path(&self, path: &VersionedPath) -> Result<PathBuf, StoreError> {
        if self.in_transaction() && self.transactional.touched(path) {
            return self.transactional.to_physical_path(path);
        }
        self.rolling.to_physical_path(path)
    }

    fn exists(&self, path: &VersionedPath) -> Result<bool, StoreError> {
        match self.resolve(path)? {
            Layer::Rolling => self.rolling.exists(path),
            Layer::Transactional => Ok(true),
            Layer::Hidden => Ok(false),
        }
    }

    fn read_byte_channel(&self, path: &VersionedPath) -> Result<File, StoreError> {
        match self.resolve(path)? {
            Layer::Rolling => self.rolling.read_byte_channel(path),
            Layer::Transactional => self.transactional.read_byte_channel(path),
            Layer::Hidden => Err(StoreError::not_found(path)),
        }
    }

    fn new_byte_channel(
        &self,
        path: &VersionedPath,
        options: WriteOptions,
    ) -> Result<ByteWriter<'_>, StoreError> {
        if !self.in_transaction() {
            return self.rolling.new_byte_channel(path, options);
        }

        let layer = self.resolve(path)?;
        let visible = match layer {
            Layer::Rolling => self.rolling.exists(path)?,
            Layer::Transactional => true,
            Layer::Hidden => false,
        };
        if options.create_new && visible {
            return Err(StoreError::already_exists(path));
        }
        match layer {
            // Appending to a rolling-only file copies it into the
            // transaction first.
            Layer::Rolling if options.append && visible => {
                let mut current = self.rolling.read_byte_channel(path)?;
                self.transactional.new_seeded_channel(path, &mut current)
            }
            _ => self.transactional.new_byte_channel(path, options),
        }
    }

    fn copy(
        &self,
        source: &VersionedPath,
        target: &VersionedPath,
        options: CopyOptions,
    ) -> Result<(), StoreError> {
        if !self.in_transaction() {
            return self.rolling.copy(source, target, options);
        }
        if !self.check_transfer(source, target, options)? {
            return Ok(());
        }
        self.materialize(source)?;
        self.transactional
            .copy(source, target, CopyOptions::replace_existing())
    }

    fn move_file(
        &self,
        source: &VersionedPath,
        target: &VersionedPath,
        options: CopyOptions,
    ) -> Result<(), StoreError> {
        if !self.in_transaction() {
            return self.rolling.move_file(source, target, options);
        }
        if !self.check_transfer(source, target, options)? {
            return Ok(());
        }
        self.materialize(source)?;
        self.transactional
            .move_file(source, target, CopyOptions::replace_existing())?;
        self.transactional.mark_deleted(source)
    }

    fn delete_if_exists(&self, path: &VersionedPath) -> Result<bool, StoreError> {
        if !self.in_transaction() {
            return self.rolling.delete_if_exists(path);
        }
        let existed = self.exists(path)?;
        if existed {
            self.transactional.mark_deleted(path)?;
        }
        Ok(existed)
    }

    fn probe_content_type(&self, path: &VersionedPath) -> Result<Option<String>, StoreError> {
        match self.resolve(path)? {
            Layer::Rolling => self.rolling.probe_content_type(path),
            Layer::Transactional => self.transactional.probe_content_type(path),
            Layer::Hidden => Err(StoreError::not_found(path)),
        }
    }
}

impl<T> std::fmt::Debug for HybridStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridStore")
            .field("rolling", &self.rolling)
            .field("transactional", &self.transactional)
            .finish()
    }
}

#[cfg(test)]
#[path = "hybrid_tests.rs"]
mod tests;

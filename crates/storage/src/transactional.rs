// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transactional store: per-transaction private writes
//!
//! Each transaction writes under its own ordinal directory, so concurrent
//! transactions never see each other's files. Deletions of paths that live
//! below this store (in the rolling store) are recorded as tombstone files
//! so they survive a restart.
//!
//! ```text
//! <root>/
//!   <ordinal>/<owner>/<version>/<path>
//!   tombstones/<ordinal>/<owner>/<version>/<path>
//!   staging/<uuid>.part
//! ```
//!
//! No eviction applies here; a transaction's files stay until it is
//! discarded.

use crate::channel::{ByteWriter, CopyOptions, PublishTarget, WriteOptions};
use crate::error::StoreError;
use crate::staged::StagedFile;
use crate::store::VersionedStore;
use crate::util::{prune_empty_dirs, remove_file_if_exists, reset_dir, walk_files};
use ocs_core::{ContentTypeProbe, NoProbe, TransactionContext, TransactionId, VersionedPath};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const TOMBSTONES_DIR: &str = "tombstones";
const STAGING_DIR: &str = "staging";

/// Ordinal used for paths resolved outside any transaction; never handed out
const PLACEHOLDER: TransactionId = TransactionId(0);

/// One path a transaction has changed
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum TransactionChange {
    Written(VersionedPath),
    Deleted(VersionedPath),
}

impl TransactionChange {
    pub fn path(&self) -> &VersionedPath {
        match self {
            TransactionChange::Written(path) | TransactionChange::Deleted(path) => path,
        }
    }
}

/// Store whose contents are scoped to the active transaction
pub struct TransactionalStore<T> {
    root: PathBuf,
    tombstones_dir: PathBuf,
    staging_dir: PathBuf,
    context: T,
    probe: Arc<dyn ContentTypeProbe>,
}

impl<T: TransactionContext> TransactionalStore<T> {
    /// Open or create a transactional store at `root`
    ///
    /// Existing transaction directories are left in place; see
    /// [`leftover_transactions`](Self::leftover_transactions).
    pub fn open(root: &Path, context: T) -> Result<Self, StoreError> {
        fs::create_dir_all(root)?;
        let staging_dir = root.join(STAGING_DIR);
        let abandoned = reset_dir(&staging_dir)?;
        let store = Self {
            root: root.to_path_buf(),
            tombstones_dir: root.join(TOMBSTONES_DIR),
            staging_dir,
            context,
            probe: Arc::new(NoProbe),
        };

        let leftover = store.leftover_transactions()?;
        if !leftover.is_empty() {
            tracing::warn!(
                root = %store.root.display(),
                transactions = ?leftover,
                "transactional store has leftover transactions"
            );
        }
        tracing::info!(root = %store.root.display(), abandoned, "transactional store opened");
        Ok(store)
    }

    pub fn with_probe(mut self, probe: Arc<dyn ContentTypeProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The caller's active transaction, if any
    pub fn active_transaction(&self) -> Option<TransactionId> {
        self.context.active()
    }

    /// True if the active transaction has deleted `path`
    pub fn is_deleted(&self, path: &VersionedPath) -> bool {
        self.context
            .active()
            .is_some_and(|txn| self.tombstone_path(txn, path).is_file())
    }

    /// True if the active transaction has written or deleted `path`
    pub fn touched(&self, path: &VersionedPath) -> bool {
        self.context.active().is_some_and(|txn| {
            self.file_path(txn, path).is_file() || self.tombstone_path(txn, path).is_file()
        })
    }

    /// Hide `path` from the active transaction, including any copy below it
    pub fn mark_deleted(&self, path: &VersionedPath) -> Result<(), StoreError> {
        let txn = self.require("delete", path)?;
        self.remove_local(txn, path)?;
        let tombstone = self.tombstone_path(txn, path);
        if let Some(parent) = tombstone.parent() {
            fs::create_dir_all(parent)?;
        }
        File::create(&tombstone)?;
        tracing::debug!(%txn, %path, "tombstoned");
        Ok(())
    }

    /// Everything `txn` wrote or deleted, sorted
    pub fn changes(&self, txn: TransactionId) -> Result<Vec<TransactionChange>, StoreError> {
        let mut changes = Vec::new();
        let written_root = self.txn_dir(txn);
        for file in walk_files(&written_root)? {
            if let Some(path) = parse_relative(&written_root, &file) {
                changes.push(TransactionChange::Written(path));
            }
        }
        let tombstone_root = self.tombstones_dir.join(txn.0.to_string());
        for file in walk_files(&tombstone_root)? {
            if let Some(path) = parse_relative(&tombstone_root, &file) {
                changes.push(TransactionChange::Deleted(path));
            }
        }
        changes.sort();
        Ok(changes)
    }

    /// Remove every file and tombstone belonging to `txn`
    pub fn discard(&self, txn: TransactionId) -> Result<(), StoreError> {
        remove_dir_if_exists(&self.txn_dir(txn))?;
        remove_dir_if_exists(&self.tombstones_dir.join(txn.0.to_string()))?;
        tracing::info!(%txn, "transaction discarded");
        Ok(())
    }

    /// Transactions with files or tombstones on disk, ascending
    pub fn leftover_transactions(&self) -> Result<Vec<TransactionId>, StoreError> {
        let mut found = BTreeSet::new();
        for dir in [&self.root, &self.tombstones_dir] {
            let entries = match fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            };
            for entry in entries {
                let entry = entry?;
                if !entry.file_type()?.is_dir() {
                    continue;
                }
                let ordinal = entry.file_name().to_str().and_then(|n| n.parse::<u64>().ok());
                if let Some(ordinal) = ordinal.filter(|n| *n != PLACEHOLDER.0) {
                    found.insert(TransactionId(ordinal));
                }
            }
        }
        Ok(found.into_iter().collect())
    }

    /// Largest ordinal present on disk, for seeding a new ordinal counter
    pub fn highest_ordinal(&self) -> Result<Option<TransactionId>, StoreError> {
        Ok(self.leftover_transactions()?.pop())
    }

    /// Start a write seeded with `seed`, for layering stores
    pub(crate) fn new_seeded_channel(
        &self,
        path: &VersionedPath,
        seed: &mut dyn io::Read,
    ) -> Result<ByteWriter<'_>, StoreError> {
        let txn = self.require("write", path)?;
        let staged = StagedFile::seeded(&self.staging_dir, seed)?;
        Ok(ByteWriter::new(
            staged,
            path.clone(),
            self.file_path(txn, path),
            false,
            self,
        ))
    }

    fn require(&self, operation: &'static str, path: &VersionedPath) -> Result<TransactionId, StoreError> {
        self.context
            .active()
            .ok_or_else(|| StoreError::inactive(operation, path))
    }

    fn txn_dir(&self, txn: TransactionId) -> PathBuf {
        self.root.join(txn.0.to_string())
    }

    fn file_path(&self, txn: TransactionId, path: &VersionedPath) -> PathBuf {
        self.txn_dir(txn).join(path.to_relative_path())
    }

    fn tombstone_path(&self, txn: TransactionId, path: &VersionedPath) -> PathBuf {
        self.tombstones_dir
            .join(txn.0.to_string())
            .join(path.to_relative_path())
    }

    /// Ordinal directory a physical path lives under
    fn owning_transaction(&self, file: &Path) -> Option<TransactionId> {
        let relative = file.strip_prefix(&self.root).ok()?;
        let first = relative.iter().next()?.to_str()?;
        first.parse().ok().map(TransactionId)
    }

    fn local_exists(&self, txn: TransactionId, path: &VersionedPath) -> bool {
        self.file_path(txn, path).is_file()
    }

    fn remove_local(&self, txn: TransactionId, path: &VersionedPath) -> Result<bool, StoreError> {
        let file = self.file_path(txn, path);
        let removed = remove_file_if_exists(&file)?;
        if removed {
            prune_empty_dirs(file.parent(), &self.root);
        }
        Ok(removed)
    }

    fn clear_tombstone(&self, txn: TransactionId, path: &VersionedPath) -> Result<(), StoreError> {
        let tombstone = self.tombstone_path(txn, path);
        if remove_file_if_exists(&tombstone)? {
            prune_empty_dirs(tombstone.parent(), &self.tombstones_dir);
        }
        Ok(())
    }

    fn check_transfer(
        &self,
        txn: TransactionId,
        source: &VersionedPath,
        target: &VersionedPath,
        options: CopyOptions,
    ) -> Result<(), StoreError> {
        if !self.local_exists(txn, source) {
            return Err(StoreError::not_found(source));
        }
        if source != target && !options.replace_existing && self.local_exists(txn, target) {
            return Err(StoreError::already_exists(target));
        }
        Ok(())
    }
}

impl<T: TransactionContext> PublishTarget for TransactionalStore<T> {
    fn publish(
        &self,
        staged: StagedFile,
        path: &VersionedPath,
        dest: &Path,
        create_new: bool,
    ) -> Result<(), StoreError> {
        // The destination was fixed when the channel opened, so a commit
        // lands in the transaction that started the write.
        if create_new {
            staged.publish_new(dest).map_err(|err| match err.kind() {
                io::ErrorKind::AlreadyExists => StoreError::already_exists(path),
                _ => err.into(),
            })?;
        } else {
            staged.publish(dest)?;
        }
        if let Some(txn) = self.owning_transaction(dest) {
            self.clear_tombstone(txn, path)?;
        }
        tracing::debug!(%path, dest = %dest.display(), "transactional write committed");
        Ok(())
    }
}

impl<T: TransactionContext> VersionedStore for TransactionalStore<T> {
    /// Location inside the active transaction; a placeholder ordinal that is
    /// never allocated when none is active
    fn to_physical_path(&self, path: &VersionedPath) -> Result<PathBuf, StoreError> {
        let txn = self.context.active().unwrap_or(PLACEHOLDER);
        Ok(self.file_path(txn, path))
    }

    fn exists(&self, path: &VersionedPath) -> Result<bool, StoreError> {
        Ok(self
            .context
            .active()
            .is_some_and(|txn| self.local_exists(txn, path)))
    }

    fn read_byte_channel(&self, path: &VersionedPath) -> Result<File, StoreError> {
        let Some(txn) = self.context.active() else {
            return Err(StoreError::not_found(path));
        };
        match File::open(self.file_path(txn, path)) {
            Ok(file) => Ok(file),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(StoreError::not_found(path)),
            Err(err) => Err(err.into()),
        }
    }

    fn new_byte_channel(
        &self,
        path: &VersionedPath,
        options: WriteOptions,
    ) -> Result<ByteWriter<'_>, StoreError> {
        let txn = self.require("write", path)?;
        let exists = self.local_exists(txn, path);
        if options.create_new && exists {
            return Err(StoreError::already_exists(path));
        }
        let staged = if options.append && exists {
            let mut current = File::open(self.file_path(txn, path))?;
            StagedFile::seeded(&self.staging_dir, &mut current)?
        } else {
            StagedFile::create(&self.staging_dir)?
        };
        Ok(ByteWriter::new(
            staged,
            path.clone(),
            self.file_path(txn, path),
            options.create_new,
            self,
        ))
    }

    fn copy(
        &self,
        source: &VersionedPath,
        target: &VersionedPath,
        options: CopyOptions,
    ) -> Result<(), StoreError> {
        let txn = self.require("copy", target)?;
        self.check_transfer(txn, source, target, options)?;
        if source == target {
            return Ok(());
        }
        let mut from = File::open(self.file_path(txn, source))?;
        let staged = StagedFile::seeded(&self.staging_dir, &mut from)?;
        staged.publish(&self.file_path(txn, target))?;
        self.clear_tombstone(txn, target)
    }

    fn move_file(
        &self,
        source: &VersionedPath,
        target: &VersionedPath,
        options: CopyOptions,
    ) -> Result<(), StoreError> {
        let txn = self.require("move", target)?;
        self.check_transfer(txn, source, target, options)?;
        if source == target {
            return Ok(());
        }
        let from = self.file_path(txn, source);
        let to = self.file_path(txn, target);
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&from, &to)?;
        prune_empty_dirs(from.parent(), &self.root);
        self.clear_tombstone(txn, target)
    }

    fn delete_if_exists(&self, path: &VersionedPath) -> Result<bool, StoreError> {
        let txn = self.require("delete", path)?;
        self.remove_local(txn, path)
    }

    fn probe_content_type(&self, path: &VersionedPath) -> Result<Option<String>, StoreError> {
        if !self.exists(path)? {
            return Err(StoreError::not_found(path));
        }
        Ok(self.probe.probe(&self.to_physical_path(path)?)?)
    }
}

impl<T> std::fmt::Debug for TransactionalStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionalStore")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

fn parse_relative(root: &Path, file: &Path) -> Option<VersionedPath> {
    file.strip_prefix(root)
        .ok()
        .and_then(VersionedPath::from_relative_path)
}

fn remove_dir_if_exists(dir: &Path) -> io::Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
#[path = "transactional_tests.rs"]
mod tests;

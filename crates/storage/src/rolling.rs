// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rolling store: bounded, path-addressed working area
//!
//! Content lives under `content/<owner>/<version>/<path>` and is tracked by
//! the same journaled LRU index as the cache store, keyed by versioned path.
//! Every read, write, copy and move counts as an access.

use crate::channel::{ByteWriter, CopyOptions, PublishTarget, WriteOptions};
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::eviction::{EvictionStrategy, StoreSnapshot};
use crate::index::JournaledIndex;
use crate::journal::{CompactionResult, JournalStats};
use crate::staged::StagedFile;
use crate::store::VersionedStore;
use crate::util::{prune_empty_dirs, remove_file_if_exists, reset_dir, walk_files};
use ocs_core::{ContentTypeProbe, NoProbe, VersionedPath};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

const CONTENT_DIR: &str = "content";
const STAGING_DIR: &str = "staging";

/// Journaled LRU store addressed by versioned path
pub struct RollingStore {
    root: PathBuf,
    content_dir: PathBuf,
    staging_dir: PathBuf,
    strategy: Box<dyn EvictionStrategy>,
    probe: Arc<dyn ContentTypeProbe>,
    index: Mutex<JournaledIndex<VersionedPath>>,
}

impl RollingStore {
    /// Open or create a rolling store at `root`, reconciling it with disk
    pub fn open(root: &Path, strategy: Box<dyn EvictionStrategy>) -> Result<Self, StoreError> {
        fs::create_dir_all(root)?;
        let content_dir = root.join(CONTENT_DIR);
        let staging_dir = root.join(STAGING_DIR);
        fs::create_dir_all(&content_dir)?;
        let abandoned = reset_dir(&staging_dir)?;

        let (index, dangling) = JournaledIndex::open(root, |path: &VersionedPath| {
            content_dir.join(path.to_relative_path())
        })?;

        let store = Self {
            root: root.to_path_buf(),
            content_dir,
            staging_dir,
            strategy,
            probe: Arc::new(NoProbe),
            index: Mutex::new(index),
        };
        let orphans = store.remove_orphans()?;

        let snapshot = store.snapshot();
        tracing::info!(
            root = %store.root.display(),
            entries = snapshot.entries,
            bytes = snapshot.bytes,
            dangling,
            orphans,
            abandoned,
            "rolling store opened"
        );
        Ok(store)
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        Self::open(&config.root, config.eviction.into_strategy())
    }

    pub fn with_probe(mut self, probe: Arc<dyn ContentTypeProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn count(&self) -> usize {
        self.lock().snapshot().entries
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.lock().snapshot()
    }

    /// Live paths, least recently used first
    pub fn lru_order(&self) -> Vec<VersionedPath> {
        self.lock().keys()
    }

    pub fn compact_journal(&self) -> Result<CompactionResult, StoreError> {
        self.lock().compact()
    }

    pub fn journal_stats(&self) -> Result<JournalStats, StoreError> {
        self.lock().journal_stats()
    }

    pub fn close(self) -> Result<(), StoreError> {
        let index = self.index.into_inner().unwrap_or_else(|e| e.into_inner());
        index.close()
    }

    fn lock(&self) -> MutexGuard<'_, JournaledIndex<VersionedPath>> {
        self.index.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn content_path(&self, path: &VersionedPath) -> PathBuf {
        self.content_dir.join(path.to_relative_path())
    }

    fn delete_content(&self, path: &VersionedPath) {
        let file = self.content_path(path);
        if let Err(err) = remove_file_if_exists(&file) {
            tracing::warn!(%path, file = %file.display(), error = %err, "failed to delete content");
        }
        prune_empty_dirs(file.parent(), &self.content_dir);
    }

    fn evict(&self, index: &mut JournaledIndex<VersionedPath>) -> Result<(), StoreError> {
        index.evict(self.strategy.as_ref(), |victim| self.delete_content(victim))?;
        Ok(())
    }

    /// Check the source is live and the target may be written
    fn check_transfer(
        &self,
        index: &JournaledIndex<VersionedPath>,
        source: &VersionedPath,
        target: &VersionedPath,
        options: CopyOptions,
    ) -> Result<(), StoreError> {
        if !index.contains(source) {
            return Err(StoreError::not_found(source));
        }
        if source != target && !options.replace_existing && index.contains(target) {
            return Err(StoreError::already_exists(target));
        }
        Ok(())
    }

    fn remove_orphans(&self) -> Result<usize, StoreError> {
        let index = self.lock();
        let mut removed = 0;
        for file in walk_files(&self.content_dir)? {
            let live = file
                .strip_prefix(&self.content_dir)
                .ok()
                .and_then(VersionedPath::from_relative_path)
                .is_some_and(|path| index.contains(&path) && self.content_path(&path) == file);
            if live {
                continue;
            }
            tracing::warn!(file = %file.display(), "removing unjournaled content");
            remove_file_if_exists(&file)?;
            prune_empty_dirs(file.parent(), &self.content_dir);
            removed += 1;
        }
        Ok(removed)
    }
}

impl PublishTarget for RollingStore {
    fn publish(
        &self,
        staged: StagedFile,
        path: &VersionedPath,
        dest: &Path,
        create_new: bool,
    ) -> Result<(), StoreError> {
        let size = staged.len();
        let mut index = self.lock();
        if create_new && index.contains(path) {
            return Err(StoreError::already_exists(path));
        }
        staged.publish(dest)?;
        index.insert(path.clone(), size)?;
        tracing::debug!(%path, size, "rolling write committed");
        self.evict(&mut index)
    }
}

impl VersionedStore for RollingStore {
    fn to_physical_path(&self, path: &VersionedPath) -> Result<PathBuf, StoreError> {
        Ok(self.content_path(path))
    }

    fn exists(&self, path: &VersionedPath) -> Result<bool, StoreError> {
        Ok(self.lock().contains(path))
    }

    fn read_byte_channel(&self, path: &VersionedPath) -> Result<File, StoreError> {
        let mut index = self.lock();
        if !index.contains(path) {
            return Err(StoreError::not_found(path));
        }
        let file = File::open(self.content_path(path))?;
        index.touch(path)?;
        Ok(file)
    }

    fn new_byte_channel(
        &self,
        path: &VersionedPath,
        options: WriteOptions,
    ) -> Result<ByteWriter<'_>, StoreError> {
        let exists = self.exists(path)?;
        if options.create_new && exists {
            return Err(StoreError::already_exists(path));
        }
        let staged = if options.append && exists {
            let mut current = self.read_byte_channel(path)?;
            StagedFile::seeded(&self.staging_dir, &mut current)?
        } else {
            StagedFile::create(&self.staging_dir)?
        };
        Ok(ByteWriter::new(
            staged,
            path.clone(),
            self.content_path(path),
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
        let mut index = self.lock();
        self.check_transfer(&index, source, target, options)?;
        if source == target {
            index.touch(source)?;
            return Ok(());
        }

        let mut from = File::open(self.content_path(source))?;
        let staged = StagedFile::seeded(&self.staging_dir, &mut from)?;
        let size = staged.len();
        staged.publish(&self.content_path(target))?;
        index.touch(source)?;
        index.insert(target.clone(), size)?;
        self.evict(&mut index)
    }

    fn move_file(
        &self,
        source: &VersionedPath,
        target: &VersionedPath,
        options: CopyOptions,
    ) -> Result<(), StoreError> {
        let mut index = self.lock();
        self.check_transfer(&index, source, target, options)?;
        if source == target {
            index.touch(source)?;
            return Ok(());
        }

        // Link the target into place before journaling, so a crash at any
        // point leaves the source recoverable.
        let from = self.content_path(source);
        let staging = self.staging_dir.join(format!("{}.part", uuid::Uuid::new_v4()));
        if fs::hard_link(&from, &staging).is_err() {
            fs::copy(&from, &staging)?;
        }
        let to = self.content_path(target);
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        if let Err(err) = fs::rename(&staging, &to) {
            let _ = remove_file_if_exists(&staging);
            return Err(err.into());
        }

        let size = index.size(source).unwrap_or(0);
        index.insert(target.clone(), size)?;
        index.remove(source)?;
        self.delete_content(source);
        tracing::debug!(%source, %target, "rolling move");
        Ok(())
    }

    fn delete_if_exists(&self, path: &VersionedPath) -> Result<bool, StoreError> {
        let mut index = self.lock();
        if !index.remove(path)? {
            return Ok(false);
        }
        self.delete_content(path);
        Ok(true)
    }

    fn probe_content_type(&self, path: &VersionedPath) -> Result<Option<String>, StoreError> {
        let index = self.lock();
        if !index.contains(path) {
            return Err(StoreError::not_found(path));
        }
        Ok(self.probe.probe(&self.content_path(path))?)
    }
}

impl std::fmt::Debug for RollingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RollingStore")
            .field("root", &self.root)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "rolling_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Digest-addressed cache store
//!
//! Content is stored once per digest under
//! `objects/<algorithm>/<first two hex chars>/<hex>`. Every access is
//! journaled so the LRU order survives restarts, and an eviction strategy
//! bounds the store after each insertion.
//!
//! ```text
//! <root>/
//!   journal.jsonl
//!   objects/sha256/ab/ab12…
//!   staging/<uuid>.part
//! ```

use crate::channel::{CopyOptions, WriteOptions};
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::eviction::{EvictionStrategy, StoreSnapshot};
use crate::index::JournaledIndex;
use crate::journal::{CompactionResult, JournalStats};
use crate::staged::StagedFile;
use crate::store::VersionedStore;
use crate::util::{prune_empty_dirs, remove_file_if_exists, reset_dir, walk_files};
use ocs_core::{ContentTypeProbe, Digest, DigestCalculator, NoProbe, VersionedPath};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

const OBJECTS_DIR: &str = "objects";
const STAGING_DIR: &str = "staging";

/// Journaled, digest-addressed LRU cache
pub struct CacheStore {
    root: PathBuf,
    objects_dir: PathBuf,
    staging_dir: PathBuf,
    strategy: Box<dyn EvictionStrategy>,
    calculator: Arc<dyn DigestCalculator>,
    probe: Arc<dyn ContentTypeProbe>,
    index: Mutex<JournaledIndex<Digest>>,
}

impl CacheStore {
    /// Open or create a cache at `root`
    ///
    /// Replays the journal, drops entries whose object file is gone, deletes
    /// object files no entry refers to, and empties the staging directory.
    pub fn open(
        root: &Path,
        strategy: Box<dyn EvictionStrategy>,
        calculator: Arc<dyn DigestCalculator>,
    ) -> Result<Self, StoreError> {
        std::fs::create_dir_all(root)?;
        let objects_dir = root.join(OBJECTS_DIR);
        let staging_dir = root.join(STAGING_DIR);
        std::fs::create_dir_all(&objects_dir)?;
        let abandoned = reset_dir(&staging_dir)?;

        let (index, dangling) =
            JournaledIndex::open(root, |digest: &Digest| object_path(&objects_dir, digest))?;

        let store = Self {
            root: root.to_path_buf(),
            objects_dir,
            staging_dir,
            strategy,
            calculator,
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
            "cache store opened"
        );
        Ok(store)
    }

    /// Open a cache from configuration
    pub fn from_config(
        config: &StoreConfig,
        calculator: Arc<dyn DigestCalculator>,
    ) -> Result<Self, StoreError> {
        Self::open(&config.root, config.eviction.into_strategy(), calculator)
    }

    /// Use `probe` for [`probe_content_type`](Self::probe_content_type)
    pub fn with_probe(mut self, probe: Arc<dyn ContentTypeProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start a new entry whose bytes originate from `origin`
    pub fn new_cache_entry(&self, origin: &VersionedPath) -> Result<CacheEntryWriter<'_>, StoreError> {
        let staged = StagedFile::create(&self.staging_dir)?;
        Ok(CacheEntryWriter {
            store: self,
            staged,
            origin: origin.clone(),
        })
    }

    /// Store `bytes` and return their digest
    pub fn write(&self, origin: &VersionedPath, bytes: &[u8]) -> Result<Digest, StoreError> {
        let mut writer = self.new_cache_entry(origin)?;
        writer.write_all(bytes)?;
        writer.commit()
    }

    pub fn exists(&self, digest: &Digest) -> bool {
        self.lock().contains(digest)
    }

    /// Open an entry for reading and mark it most recently used
    pub fn read_byte_channel(&self, digest: &Digest) -> Result<File, StoreError> {
        let mut index = self.lock();
        if !index.contains(digest) {
            return Err(StoreError::not_found(digest));
        }
        let file = File::open(self.object_path(digest))?;
        index.touch(digest)?;
        Ok(file)
    }

    /// Media type of an entry, via the configured probe
    pub fn probe_content_type(&self, digest: &Digest) -> Result<Option<String>, StoreError> {
        let index = self.lock();
        if !index.contains(digest) {
            return Err(StoreError::not_found(digest));
        }
        Ok(self.probe.probe(&self.object_path(digest))?)
    }

    /// Copy an entry's bytes to `target` in another store
    ///
    /// The entry is marked most recently used.
    pub fn copy(
        &self,
        digest: &Digest,
        target: &VersionedPath,
        options: CopyOptions,
        store: &dyn VersionedStore,
    ) -> Result<(), StoreError> {
        if !options.replace_existing && store.exists(target)? {
            return Err(StoreError::already_exists(target));
        }
        let mut source = self.read_byte_channel(digest)?;
        let mut writer = store.new_byte_channel(target, WriteOptions::truncate())?;
        io::copy(&mut source, &mut writer)?;
        writer.commit()
    }

    /// Drop an entry; returns false if it was not present
    pub fn remove(&self, digest: &Digest) -> Result<bool, StoreError> {
        let mut index = self.lock();
        if !index.remove(digest)? {
            return Ok(false);
        }
        self.delete_object(digest);
        Ok(true)
    }

    /// On-disk location of a live entry
    pub fn entry_path(&self, digest: &Digest) -> Option<PathBuf> {
        self.lock()
            .contains(digest)
            .then(|| self.object_path(digest))
    }

    pub fn count(&self) -> usize {
        self.lock().snapshot().entries
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.lock().snapshot()
    }

    /// Live digests, least recently used first
    pub fn lru_order(&self) -> Vec<Digest> {
        self.lock().keys()
    }

    /// Rewrite the journal to one `Add` per live entry
    pub fn compact_journal(&self) -> Result<CompactionResult, StoreError> {
        self.lock().compact()
    }

    pub fn journal_stats(&self) -> Result<JournalStats, StoreError> {
        self.lock().journal_stats()
    }

    /// Flush the journal and release the store
    pub fn close(self) -> Result<(), StoreError> {
        let index = self.index.into_inner().unwrap_or_else(|e| e.into_inner());
        index.close()
    }

    fn lock(&self) -> MutexGuard<'_, JournaledIndex<Digest>> {
        self.index.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn object_path(&self, digest: &Digest) -> PathBuf {
        object_path(&self.objects_dir, digest)
    }

    fn delete_object(&self, digest: &Digest) {
        let path = self.object_path(digest);
        if let Err(err) = remove_file_if_exists(&path) {
            tracing::warn!(%digest, path = %path.display(), error = %err, "failed to delete object");
        }
        prune_empty_dirs(path.parent(), &self.objects_dir);
    }

    fn commit(&self, mut staged: StagedFile, origin: &VersionedPath) -> Result<Digest, StoreError> {
        staged.finish()?;
        let digest = self.calculator.digest_file(staged.path())?;
        let size = staged.len();

        let mut index = self.lock();
        if index.contains(&digest) {
            index.touch(&digest)?;
            drop(index);
            staged.discard()?;
            tracing::debug!(%digest, %origin, "content already cached");
            return Ok(digest);
        }

        let dest = self.object_path(&digest);
        staged.publish(&dest)?;
        if let Err(err) = index.insert(digest.clone(), size) {
            let _ = remove_file_if_exists(&dest);
            return Err(err);
        }
        tracing::debug!(%digest, %origin, size, "cached");

        index.evict(self.strategy.as_ref(), |victim| self.delete_object(victim))?;
        Ok(digest)
    }

    fn remove_orphans(&self) -> Result<usize, StoreError> {
        let index = self.lock();
        let mut removed = 0;
        for path in walk_files(&self.objects_dir)? {
            let live = parse_object_path(&self.objects_dir, &path)
                .is_some_and(|digest| index.contains(&digest));
            if live {
                continue;
            }
            tracing::warn!(path = %path.display(), "removing unjournaled object");
            remove_file_if_exists(&path)?;
            prune_empty_dirs(path.parent(), &self.objects_dir);
            removed += 1;
        }
        Ok(removed)
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("root", &self.root)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

/// Pending cache entry
///
/// Bytes are staged until [`commit`](Self::commit), which digests them and
/// publishes the object. Dropping the writer discards the staged bytes.
pub struct CacheEntryWriter<'a> {
    store: &'a CacheStore,
    staged: StagedFile,
    origin: VersionedPath,
}

impl CacheEntryWriter<'_> {
    pub fn origin(&self) -> &VersionedPath {
        &self.origin
    }

    /// Publish the entry and return its digest
    ///
    /// If the digest is already cached the existing entry is touched and the
    /// staged bytes are discarded.
    pub fn commit(self) -> Result<Digest, StoreError> {
        let CacheEntryWriter {
            store,
            staged,
            origin,
        } = self;
        store.commit(staged, &origin)
    }

    /// Discard the staged bytes
    pub fn abort(self) -> Result<(), StoreError> {
        self.staged.discard()?;
        Ok(())
    }
}

impl Write for CacheEntryWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.staged.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.staged.flush()
    }
}

fn object_path(objects_dir: &Path, digest: &Digest) -> PathBuf {
    let hex = digest.hex();
    let fan_out = hex.get(..2).unwrap_or(hex);
    objects_dir.join(digest.algorithm()).join(fan_out).join(hex)
}

/// Inverse of [`object_path`]; `None` for anything not laid out by it
fn parse_object_path(objects_dir: &Path, path: &Path) -> Option<Digest> {
    let relative = path.strip_prefix(objects_dir).ok()?;
    let mut parts = relative.iter().map(|part| part.to_str());
    let (Some(Some(algorithm)), Some(Some(_)), Some(Some(hex)), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    let digest = Digest::from_hex(algorithm, hex).ok()?;
    (object_path(objects_dir, &digest) == path).then_some(digest)
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;

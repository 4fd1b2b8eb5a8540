// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Journal module
//!
//! Durable, append-only record of every `Add`/`Remove`/`Touch` applied to a
//! store's live set. Replaying the journal rebuilds the live set in LRU
//! order after a restart.
//!
//! ## Architecture
//!
//! ```text
//! JournalEvent → JournalEntry → JournalWriter → disk (journal.jsonl)
//!                                                   ↓
//!                              JournalReader → replay → LruQueue
//! ```
//!
//! ## Durability Guarantees
//!
//! - Every append is followed by `fsync()` before returning
//! - Checksums detect corrupted records
//! - A torn final record (crash during append) is truncated on open
//! - An invalid record followed by valid ones aborts the open
//! - Compaction writes a temp file and renames it over the journal

pub mod entry;
pub mod reader;
pub mod writer;

pub use entry::{JournalEntry, JournalEvent};
pub use reader::{JournalEntryIter, JournalInvalidRecord, JournalReader, JournalValidation};
pub use writer::JournalWriter;

use crate::lru::LruQueue;
use crate::util::sync_dir_best_effort;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::fs::{File, OpenOptions};
use std::hash::Hash;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fixed journal file name at every store root
pub const JOURNAL_FILE_NAME: &str = "journal.jsonl";

/// Errors that can occur in journal operations
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed record at line {line}: {reason}")]
    Malformed { line: u64, reason: String },
    #[error("checksum mismatch at line {line}")]
    ChecksumMismatch { line: u64 },
    #[error("journal corrupted at line {line}: {reason}")]
    Corrupted { line: u64, reason: String },
}

/// Keys a journal can record
pub trait JournalKey: Clone + Eq + Hash + Debug + Serialize + DeserializeOwned {}

impl<T: Clone + Eq + Hash + Debug + Serialize + DeserializeOwned> JournalKey for T {}

/// Live set reconstructed by replay
#[derive(Debug)]
pub struct Replay<K> {
    /// Live keys, least recently used first
    pub order: LruQueue<K>,
    /// Valid records read
    pub entries: u64,
    /// Bytes dropped from a torn tail
    pub truncated_bytes: u64,
}

/// Result of a compaction operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactionResult {
    pub entries_before: u64,
    pub entries_after: u64,
    pub bytes_reclaimed: u64,
}

/// Journal statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalStats {
    /// Records currently in the file
    pub entries: u64,
    /// Size of the file in bytes
    pub bytes: u64,
}

/// Write-ahead journal for one store root
pub struct Journal<K> {
    path: PathBuf,
    writer: JournalWriter<K>,
    entries: u64,
}

impl<K: JournalKey> Journal<K> {
    /// Open or create the journal under `root` and replay it
    pub fn open(root: &Path) -> Result<(Self, Replay<K>), JournalError> {
        let path = root.join(JOURNAL_FILE_NAME);
        let (replay, next_sequence) = Self::replay(&path)?;
        let writer = JournalWriter::open(&path, next_sequence)?;

        let journal = Self {
            path,
            writer,
            entries: replay.entries,
        };
        Ok((journal, replay))
    }

    /// Fold the journal at `path` into a live set
    ///
    /// `Add` inserts or moves a key to the most-recent end, `Touch` moves an
    /// existing key, `Remove` drops it. `Touch`/`Remove` of an absent key is
    /// ignored. A torn tail is truncated away; mid-stream corruption fails.
    /// Returns the replay and the next sequence number to use.
    pub fn replay(path: &Path) -> Result<(Replay<K>, u64), JournalError> {
        let reader = JournalReader::<K>::open_or_empty(path);
        let mut iter = reader.entries()?;
        let mut order = LruQueue::new();
        let mut entries = 0u64;
        let mut next_sequence = 0u64;
        let mut torn: Option<(u64, String)> = None;

        while let Some(result) = iter.next() {
            match result {
                Ok(entry) => {
                    if let Some((line, reason)) = torn.take() {
                        return Err(JournalError::Corrupted { line, reason });
                    }
                    apply(&mut order, entry.event);
                    next_sequence = entry.sequence + 1;
                    entries += 1;
                }
                Err(JournalError::Io(e)) => return Err(JournalError::Io(e)),
                Err(e) => {
                    if torn.is_none() {
                        torn = Some((iter.line_number(), e.to_string()));
                    }
                }
            }
        }

        let mut truncated_bytes = 0;
        if let Some((line, reason)) = torn {
            let valid_len = iter.last_valid_position();
            let file_len = std::fs::metadata(path)?.len();
            truncated_bytes = file_len.saturating_sub(valid_len);

            tracing::warn!(
                path = %path.display(),
                line,
                %reason,
                valid_len,
                truncated_bytes,
                "journal has a torn tail; truncating at last valid record"
            );
            truncate_file(path, valid_len)?;
        }

        Ok((
            Replay {
                order,
                entries,
                truncated_bytes,
            },
            next_sequence,
        ))
    }

    /// Durably append one event
    pub fn append(&mut self, event: JournalEvent<K>) -> Result<u64, JournalError> {
        let sequence = self.writer.append(event)?;
        self.entries += 1;
        Ok(sequence)
    }

    /// Rewrite the journal as one `Add` per live key, oldest first
    ///
    /// The new journal is written to a temp file, synced, and renamed over
    /// the old one, so a crash leaves either the old or the new journal.
    /// When every record is already live the file is left untouched.
    pub fn compact<'a, I>(&mut self, live: I) -> Result<CompactionResult, JournalError>
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        let live: Vec<&K> = live.into_iter().collect();
        let entries_before = self.entries;
        let old_size = std::fs::metadata(&self.path).map(|m| m.len())?;

        if live.len() as u64 == entries_before {
            return Ok(CompactionResult {
                entries_before,
                entries_after: entries_before,
                bytes_reclaimed: 0,
            });
        }

        let temp_path = self.path.with_extension("jsonl.compact.tmp");
        let written = (|| -> Result<(), JournalError> {
            let mut out = BufWriter::new(File::create(&temp_path)?);
            for (sequence, key) in live.iter().enumerate() {
                let entry = JournalEntry::new(sequence as u64, JournalEvent::Add((*key).clone()))?;
                out.write_all(entry.to_line()?.as_bytes())?;
                out.write_all(b"\n")?;
            }
            let file = out.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
            Ok(())
        })();
        if let Err(e) = written {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e);
        }

        if let Err(e) = std::fs::rename(&temp_path, &self.path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e.into());
        }
        if let Some(parent) = self.path.parent() {
            sync_dir_best_effort(parent);
        }

        self.writer = JournalWriter::open(&self.path, live.len() as u64)?;
        self.entries = live.len() as u64;

        let new_size = std::fs::metadata(&self.path).map(|m| m.len())?;
        let result = CompactionResult {
            entries_before,
            entries_after: self.entries,
            bytes_reclaimed: old_size.saturating_sub(new_size),
        };

        tracing::info!(
            path = %self.path.display(),
            entries_before = result.entries_before,
            entries_after = result.entries_after,
            bytes_reclaimed = result.bytes_reclaimed,
            "journal compacted"
        );

        Ok(result)
    }

    pub fn stats(&self) -> Result<JournalStats, JournalError> {
        Ok(JournalStats {
            entries: self.entries,
            bytes: std::fs::metadata(&self.path)?.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and release the journal file
    pub fn close(mut self) -> Result<(), JournalError> {
        self.writer.sync()
    }
}

fn apply<K: JournalKey>(order: &mut LruQueue<K>, event: JournalEvent<K>) {
    match event {
        JournalEvent::Add(key) => {
            order.insert(key);
        }
        JournalEvent::Remove(key) => {
            order.remove(&key);
        }
        JournalEvent::Touch(key) => {
            order.touch(&key);
        }
    }
}

fn truncate_file(path: &Path, len: u64) -> Result<(), JournalError> {
    let file = OpenOptions::new().write(true).open(path)?;
    file.set_len(len)?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;

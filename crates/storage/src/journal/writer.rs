// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Journal writer for durable append operations
//!
//! Every append is fsync'd before it returns, so an acknowledged event is
//! on disk before the caller mutates in-memory state.

use super::entry::{JournalEntry, JournalEvent};
use super::{JournalError, JournalKey};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Append-only writer over one journal file
pub struct JournalWriter<K> {
    path: PathBuf,
    file: File,
    next_sequence: u64,
    bytes_written: u64,
    _key: PhantomData<fn() -> K>,
}

impl<K: JournalKey> JournalWriter<K> {
    /// Open or create a journal file, continuing at `next_sequence`
    ///
    /// If the file ends in an unterminated record (a crash between writing
    /// the record and its newline), the line is terminated first so the
    /// next append starts on a fresh line.
    pub fn open(path: &Path, next_sequence: u64) -> Result<Self, JournalError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        let mut bytes_written = 0;
        if Self::needs_terminator(&mut file)? {
            file.write_all(b"\n")?;
            file.sync_all()?;
            bytes_written = 1;
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            next_sequence,
            bytes_written,
            _key: PhantomData,
        })
    }

    fn needs_terminator(file: &mut File) -> Result<bool, JournalError> {
        let len = file.metadata()?.len();
        if len == 0 {
            return Ok(false);
        }
        file.seek(SeekFrom::Start(len - 1))?;
        let mut last = [0_u8; 1];
        file.read_exact(&mut last)?;
        Ok(last[0] != b'\n')
    }

    /// Append an event, returning its sequence number
    ///
    /// The record is durably persisted before this method returns.
    pub fn append(&mut self, event: JournalEvent<K>) -> Result<u64, JournalError> {
        let sequence = self.next_sequence;
        let entry = JournalEntry::new(sequence, event)?;
        self.write_entry(&entry)?;
        self.next_sequence += 1;
        Ok(sequence)
    }

    fn write_entry(&mut self, entry: &JournalEntry<K>) -> Result<(), JournalError> {
        let mut line = entry.to_line()?;
        line.push('\n');

        // One write per record keeps a torn write confined to the tail.
        self.file.write_all(line.as_bytes())?;
        self.file.sync_all()?;

        self.bytes_written += line.len() as u64;
        Ok(())
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<(), JournalError> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Sequence number the next append will receive
    pub fn sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Bytes written since open
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Journal reader for iterating and validating entries
//!
//! Invalid records (parse failure or checksum mismatch) are yielded as
//! errors without stopping iteration, so callers can tell a torn tail
//! (nothing valid afterwards) from mid-stream corruption.

use super::entry::JournalEntry;
use super::{JournalError, JournalKey};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Reader over one journal file
pub struct JournalReader<K> {
    path: PathBuf,
    _key: PhantomData<fn() -> K>,
}

impl<K: JournalKey> JournalReader<K> {
    /// Create a reader; a missing file reads as empty
    pub fn open_or_empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            _key: PhantomData,
        }
    }

    /// Iterate over all records
    pub fn entries(&self) -> Result<JournalEntryIter<K>, JournalError> {
        JournalEntryIter::new(&self.path)
    }

    /// Scan the whole file and report where it stops being valid
    pub fn validate(&self) -> Result<JournalValidation, JournalError> {
        let mut iter = self.entries()?;
        let mut valid_entries = 0u64;
        let mut first_invalid = None;
        let mut valid_after_invalid = false;

        while let Some(result) = iter.next() {
            match result {
                Ok(_) if first_invalid.is_some() => valid_after_invalid = true,
                Ok(_) => valid_entries += 1,
                Err(JournalError::Io(e)) => return Err(JournalError::Io(e)),
                Err(e) => {
                    if first_invalid.is_none() {
                        first_invalid = Some(JournalInvalidRecord {
                            line: iter.line_number(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        Ok(JournalValidation {
            valid_entries,
            valid_len: iter.last_valid_position(),
            first_invalid,
            valid_after_invalid,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Iterator over journal records with position tracking
pub struct JournalEntryIter<K> {
    reader: Option<BufReader<File>>,
    line_number: u64,
    /// Byte offset just past the last valid record seen before any invalid one
    last_valid_position: u64,
    position: u64,
    seen_invalid: bool,
    _key: PhantomData<fn() -> K>,
}

impl<K: JournalKey> JournalEntryIter<K> {
    fn new(path: &Path) -> Result<Self, JournalError> {
        let reader = match File::open(path) {
            Ok(file) => Some(BufReader::new(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            reader,
            line_number: 0,
            last_valid_position: 0,
            position: 0,
            seen_invalid: false,
            _key: PhantomData,
        })
    }

    /// Byte offset just past the last valid record preceding the first
    /// invalid one (or the last valid record overall if none is invalid)
    pub fn last_valid_position(&self) -> u64 {
        self.last_valid_position
    }

    /// One-based line number of the most recently read line
    pub fn line_number(&self) -> u64 {
        self.line_number
    }
}

impl<K: JournalKey> Iterator for JournalEntryIter<K> {
    type Item = Result<JournalEntry<K>, JournalError>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;

        loop {
            let mut buf = Vec::new();
            let bytes_read = match reader.read_until(b'\n', &mut buf) {
                Ok(0) => return None,
                Ok(n) => n as u64,
                Err(e) => return Some(Err(JournalError::Io(e))),
            };
            self.line_number += 1;
            self.position += bytes_read;

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line.trim(),
                Err(e) => return Some(Err(self.invalid(e.to_string()))),
            };
            if line.is_empty() {
                continue;
            }

            let entry = match JournalEntry::<K>::from_line(line) {
                Ok(entry) => entry,
                Err(e) => return Some(Err(self.invalid(e.to_string()))),
            };
            if !entry.verify() {
                self.seen_invalid = true;
                return Some(Err(JournalError::ChecksumMismatch {
                    line: self.line_number,
                }));
            }

            if !self.seen_invalid {
                self.last_valid_position = self.position;
            }
            return Some(Ok(entry));
        }
    }
}

impl<K> JournalEntryIter<K> {
    fn invalid(&mut self, reason: String) -> JournalError {
        self.seen_invalid = true;
        JournalError::Malformed {
            line: self.line_number,
            reason,
        }
    }
}

/// Validation result for a journal file
#[derive(Debug)]
pub struct JournalValidation {
    /// Valid records before the first invalid one
    pub valid_entries: u64,
    /// Byte length of the valid prefix
    pub valid_len: u64,
    pub first_invalid: Option<JournalInvalidRecord>,
    /// True if some valid record follows the first invalid one
    pub valid_after_invalid: bool,
}

impl JournalValidation {
    /// An invalid record with only garbage after it: a crash mid-append
    pub fn has_torn_tail(&self) -> bool {
        self.first_invalid.is_some() && !self.valid_after_invalid
    }

    /// An invalid record followed by valid ones: not explainable by a crash
    pub fn is_corrupted(&self) -> bool {
        self.first_invalid.is_some() && self.valid_after_invalid
    }
}

/// First invalid record found in a journal
#[derive(Debug, Clone)]
pub struct JournalInvalidRecord {
    pub line: u64,
    pub reason: String,
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;

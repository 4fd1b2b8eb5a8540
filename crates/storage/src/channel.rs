// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Byte channels for writing versioned paths
//!
//! A [`ByteWriter`] stages bytes in its store's staging directory. Nothing
//! is visible at the destination until [`ByteWriter::commit`]; dropping the
//! writer or calling [`ByteWriter::abort`] leaves the store unchanged.

use crate::error::StoreError;
use crate::staged::StagedFile;
use ocs_core::VersionedPath;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// How a byte channel treats an existing file at the destination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Start from the current content instead of an empty file
    pub append: bool,
    /// Fail with `AlreadyExists` if the path already exists
    pub create_new: bool,
}

impl WriteOptions {
    /// Replace any existing content (the default)
    pub fn truncate() -> Self {
        Self::default()
    }

    pub fn append() -> Self {
        Self {
            append: true,
            create_new: false,
        }
    }

    pub fn create_new() -> Self {
        Self {
            append: false,
            create_new: true,
        }
    }
}

/// How copy and move treat an existing target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyOptions {
    pub replace_existing: bool,
}

impl CopyOptions {
    pub fn replace_existing() -> Self {
        Self {
            replace_existing: true,
        }
    }
}

/// Store side of a byte channel: makes staged bytes visible
///
/// With `create_new` set, publishing fails with `AlreadyExists` if `path`
/// appeared after the channel was opened.
pub(crate) trait PublishTarget {
    fn publish(
        &self,
        staged: StagedFile,
        path: &VersionedPath,
        dest: &Path,
        create_new: bool,
    ) -> Result<(), StoreError>;
}

/// Pending write to one versioned path
pub struct ByteWriter<'a> {
    staged: StagedFile,
    path: VersionedPath,
    dest: PathBuf,
    create_new: bool,
    target: &'a dyn PublishTarget,
}

impl<'a> ByteWriter<'a> {
    pub(crate) fn new(
        staged: StagedFile,
        path: VersionedPath,
        dest: PathBuf,
        create_new: bool,
        target: &'a dyn PublishTarget,
    ) -> Self {
        Self {
            staged,
            path,
            dest,
            create_new,
            target,
        }
    }

    pub fn path(&self) -> &VersionedPath {
        &self.path
    }

    /// Bytes staged so far, including any content carried over for append
    pub fn len(&self) -> u64 {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.len() == 0
    }

    /// Make the written bytes visible at the destination
    pub fn commit(self) -> Result<(), StoreError> {
        self.target
            .publish(self.staged, &self.path, &self.dest, self.create_new)
    }

    /// Discard the written bytes
    pub fn abort(self) -> Result<(), StoreError> {
        self.staged.discard()?;
        Ok(())
    }
}

impl Write for ByteWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.staged.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.staged.flush()
    }
}

impl std::fmt::Debug for ByteWriter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteWriter")
            .field("path", &self.path)
            .field("dest", &self.dest)
            .field("create_new", &self.create_new)
            .field("len", &self.staged.len())
            .finish()
    }
}

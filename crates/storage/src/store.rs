// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-system-like surface over versioned paths

use crate::channel::{ByteWriter, CopyOptions, WriteOptions};
use crate::error::StoreError;
use ocs_core::VersionedPath;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

/// Operations shared by the rolling, transactional and hybrid stores
pub trait VersionedStore {
    /// Where the content for `path` lives (or would live) on disk
    fn to_physical_path(&self, path: &VersionedPath) -> Result<PathBuf, StoreError>;

    fn exists(&self, path: &VersionedPath) -> Result<bool, StoreError>;

    /// Open the content for reading; `NotFound` if absent
    fn read_byte_channel(&self, path: &VersionedPath) -> Result<File, StoreError>;

    /// Start a write that becomes visible on [`ByteWriter::commit`]
    fn new_byte_channel(
        &self,
        path: &VersionedPath,
        options: WriteOptions,
    ) -> Result<ByteWriter<'_>, StoreError>;

    /// Copy `source` to `target`
    ///
    /// `NotFound` if the source is absent, `AlreadyExists` if the target
    /// exists and `options.replace_existing` is false.
    fn copy(
        &self,
        source: &VersionedPath,
        target: &VersionedPath,
        options: CopyOptions,
    ) -> Result<(), StoreError>;

    /// Move `source` to `target`; same failure rules as [`Self::copy`]
    fn move_file(
        &self,
        source: &VersionedPath,
        target: &VersionedPath,
        options: CopyOptions,
    ) -> Result<(), StoreError>;

    /// Returns true if something was deleted
    fn delete_if_exists(&self, path: &VersionedPath) -> Result<bool, StoreError>;

    fn probe_content_type(&self, path: &VersionedPath) -> Result<Option<String>, StoreError>;

    /// Replace the content of `path` with `bytes`
    fn write(&self, path: &VersionedPath, bytes: &[u8]) -> Result<(), StoreError> {
        let mut writer = self.new_byte_channel(path, WriteOptions::truncate())?;
        writer.write_all(bytes)?;
        writer.commit()
    }
}

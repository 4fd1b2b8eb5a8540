// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Staging files
//!
//! Bytes are written to a uniquely named file in the store's staging
//! directory and only become visible when renamed into place. A staged file
//! that is dropped without being published is deleted.

use crate::util::{remove_file_if_exists, sync_dir_best_effort};
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub(crate) struct StagedFile {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    len: u64,
    done: bool,
}

impl StagedFile {
    /// Create an empty staging file under `staging_dir`
    pub(crate) fn create(staging_dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(staging_dir)?;
        let path = staging_dir.join(format!("{}.part", uuid::Uuid::new_v4()));
        let file = File::options().write(true).create_new(true).open(&path)?;
        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
            len: 0,
            done: false,
        })
    }

    /// Create a staging file pre-filled with everything `seed` yields
    pub(crate) fn seeded(staging_dir: &Path, seed: &mut dyn Read) -> io::Result<Self> {
        let mut staged = Self::create(staging_dir)?;
        io::copy(seed, &mut staged)?;
        Ok(staged)
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes written so far
    pub(crate) fn len(&self) -> u64 {
        self.len
    }

    /// Flush and fsync; further writes fail
    pub(crate) fn finish(&mut self) -> io::Result<()> {
        if let Some(writer) = self.writer.take() {
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
        }
        Ok(())
    }

    /// Atomically move the staged bytes to `dest`, replacing any file there
    pub(crate) fn publish(mut self, dest: &Path) -> io::Result<()> {
        self.finish()?;
        let parent = dest.parent();
        if let Some(parent) = parent {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&self.path, dest)?;
        self.done = true;
        if let Some(parent) = parent {
            sync_dir_best_effort(parent);
        }
        Ok(())
    }

    /// Move the staged bytes to `dest` only if nothing is there yet
    ///
    /// Fails with `AlreadyExists` otherwise, and the staged bytes are dropped.
    pub(crate) fn publish_new(mut self, dest: &Path) -> io::Result<()> {
        self.finish()?;
        let parent = dest.parent();
        if let Some(parent) = parent {
            fs::create_dir_all(parent)?;
        }
        fs::hard_link(&self.path, dest)?;
        self.done = true;
        if let Err(err) = remove_file_if_exists(&self.path) {
            tracing::debug!(
                path = %self.path.display(),
                error = %err,
                "failed to remove linked staging file"
            );
        }
        if let Some(parent) = parent {
            sync_dir_best_effort(parent);
        }
        Ok(())
    }

    /// Delete the staged bytes
    pub(crate) fn discard(mut self) -> io::Result<()> {
        self.writer = None;
        self.done = true;
        remove_file_if_exists(&self.path).map(|_| ())
    }
}

impl Write for StagedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| io::Error::other("staged file already finished"))?;
        let written = writer.write(buf)?;
        self.len += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        self.writer = None;
        if let Err(err) = remove_file_if_exists(&self.path) {
            tracing::debug!(
                path = %self.path.display(),
                error = %err,
                "failed to remove abandoned staging file"
            );
        }
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content-type probing seam

use std::io;
use std::path::Path;

/// Determines the media type of a stored file
pub trait ContentTypeProbe: Send + Sync {
    /// Media type of the file at `path`, or `None` if it cannot be determined
    fn probe(&self, path: &Path) -> io::Result<Option<String>>;
}

/// Probe that never recognises anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProbe;

impl ContentTypeProbe for NoProbe {
    fn probe(&self, _path: &Path) -> io::Result<Option<String>> {
        Ok(None)
    }
}

/// Probe returning the same media type for every file (for tests)
#[derive(Debug, Clone)]
pub struct FixedProbe(pub String);

impl ContentTypeProbe for FixedProbe {
    fn probe(&self, _path: &Path) -> io::Result<Option<String>> {
        Ok(Some(self.0.clone()))
    }
}

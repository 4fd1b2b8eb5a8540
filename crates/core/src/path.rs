// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logical file addresses
//!
//! A [`VersionedPath`] names a file inside one version of an owner (an
//! object's derivate). It says nothing about where the bytes live on disk;
//! each store maps it to its own physical layout.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Errors constructing a [`VersionedPath`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("owner id must be a single non-empty path segment: {0:?}")]
    InvalidOwner(String),
    #[error("relative path is empty")]
    EmptyPath,
    #[error("relative path must stay inside its owner: {0:?}")]
    EscapingPath(String),
}

/// Version selector: a concrete version number or the mutable head
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Version {
    Head,
    Number(u32),
}

impl Version {
    /// Directory segment used in physical layouts (`head`, `v1`, `v2`, …)
    pub fn segment(&self) -> String {
        match self {
            Version::Head => "head".to_string(),
            Version::Number(n) => format!("v{}", n),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segment())
    }
}

/// Logical file identity: (owner, version, relative path)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionedPath {
    owner: String,
    version: Version,
    path: String,
}

impl VersionedPath {
    /// Create a path, normalising separators and rejecting anything that
    /// could escape the owner's directory once mapped onto disk
    pub fn new(
        owner: impl Into<String>,
        version: Version,
        path: impl AsRef<str>,
    ) -> Result<Self, PathError> {
        let owner = owner.into();
        if owner.is_empty()
            || owner == "."
            || owner == ".."
            || owner.contains('/')
            || owner.contains('\\')
        {
            return Err(PathError::InvalidOwner(owner));
        }

        let raw = path.as_ref();
        let mut segments = Vec::new();
        for segment in raw.split(['/', '\\']) {
            match segment {
                "" => continue,
                "." | ".." => return Err(PathError::EscapingPath(raw.to_string())),
                s => segments.push(s),
            }
        }
        if raw.starts_with('/') || raw.starts_with('\\') {
            return Err(PathError::EscapingPath(raw.to_string()));
        }
        if segments.is_empty() {
            return Err(PathError::EmptyPath);
        }

        Ok(Self {
            owner,
            version,
            path: segments.join("/"),
        })
    }

    /// Shorthand for a path in the head version
    pub fn head(owner: impl Into<String>, path: impl AsRef<str>) -> Result<Self, PathError> {
        Self::new(owner, Version::Head, path)
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Relative path within the owner, `/`-separated
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The same relative path in another version
    pub fn with_version(&self, version: Version) -> Self {
        Self {
            owner: self.owner.clone(),
            version,
            path: self.path.clone(),
        }
    }

    /// `owner/version/relative/path` as a relative filesystem path
    pub fn to_relative_path(&self) -> PathBuf {
        let mut buf = PathBuf::from(&self.owner);
        buf.push(self.version.segment());
        for segment in self.path.split('/') {
            buf.push(segment);
        }
        buf
    }

    /// Parse the inverse of [`to_relative_path`](Self::to_relative_path)
    ///
    /// Returns `None` when the path does not have the expected shape.
    pub fn from_relative_path(relative: &Path) -> Option<Self> {
        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_str()?),
                _ => return None,
            }
        }
        if parts.len() < 3 {
            return None;
        }
        let version = match parts[1] {
            "head" => Version::Head,
            v => Version::Number(v.strip_prefix('v')?.parse().ok()?),
        };
        Self::new(parts[0], version, parts[2..].join("/")).ok()
    }
}

impl fmt::Display for VersionedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}/{}", self.owner, self.version, self.path)
    }
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;

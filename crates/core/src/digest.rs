// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content digests and the calculators that produce them

use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha512};
use std::fmt;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Error parsing a digest from its `algorithm:hex` form
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DigestParseError {
    #[error("digest is missing the algorithm separator: {0}")]
    MissingSeparator(String),
    #[error("digest has an empty algorithm tag: {0}")]
    EmptyAlgorithm(String),
    #[error("digest algorithm tag must be lowercase [a-z0-9-]: {0:?}")]
    InvalidAlgorithm(String),
    #[error("digest fingerprint is not lowercase hex: {0}")]
    InvalidHex(String),
}

/// Content fingerprint used as the cache key
///
/// Two digests are equal iff both the algorithm tag and the fingerprint
/// match. The fingerprint is stored as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDigest")]
pub struct Digest {
    algorithm: String,
    hex: String,
}

/// Unvalidated serde form of [`Digest`]
#[derive(Deserialize)]
struct RawDigest {
    algorithm: String,
    hex: String,
}

impl TryFrom<RawDigest> for Digest {
    type Error = DigestParseError;

    fn try_from(raw: RawDigest) -> Result<Self, Self::Error> {
        Self::from_hex(raw.algorithm, raw.hex)
    }
}

/// The tag names a directory in the cache layout, so it must be a single
/// plain path segment.
fn check_algorithm(algorithm: &str) -> Result<(), DigestParseError> {
    if algorithm.is_empty() {
        return Err(DigestParseError::EmptyAlgorithm(algorithm.to_string()));
    }
    let plain = algorithm
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if !plain {
        return Err(DigestParseError::InvalidAlgorithm(algorithm.to_string()));
    }
    Ok(())
}

impl Digest {
    /// Build a digest from an algorithm tag and raw fingerprint bytes
    pub fn from_bytes(
        algorithm: impl Into<String>,
        bytes: impl AsRef<[u8]>,
    ) -> Result<Self, DigestParseError> {
        let algorithm = algorithm.into();
        check_algorithm(&algorithm)?;
        Ok(Self {
            algorithm,
            hex: hex::encode(bytes),
        })
    }

    /// Build a digest from an algorithm tag and a hex fingerprint
    pub fn from_hex(
        algorithm: impl Into<String>,
        hex: impl Into<String>,
    ) -> Result<Self, DigestParseError> {
        let algorithm = algorithm.into();
        let hex = hex.into().to_ascii_lowercase();
        check_algorithm(&algorithm)?;
        if hex.is_empty() || hex::decode(&hex).is_err() {
            return Err(DigestParseError::InvalidHex(hex));
        }
        Ok(Self { algorithm, hex })
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Lowercase hex fingerprint
    pub fn hex(&self) -> &str {
        &self.hex
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.hex)
    }
}

impl FromStr for Digest {
    type Err = DigestParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (algorithm, hex) = s
            .split_once(':')
            .ok_or_else(|| DigestParseError::MissingSeparator(s.to_string()))?;
        if algorithm.is_empty() {
            return Err(DigestParseError::EmptyAlgorithm(s.to_string()));
        }
        Self::from_hex(algorithm, hex)
    }
}

/// Computes digests of content
///
/// Implementations must be deterministic: the same bytes always yield the
/// same digest.
pub trait DigestCalculator: Send + Sync {
    /// Algorithm tag stamped on every digest this calculator produces
    fn algorithm(&self) -> &str;

    /// Digest everything `reader` yields
    fn digest_reader(&self, reader: &mut dyn Read) -> io::Result<Digest>;

    fn digest_bytes(&self, bytes: &[u8]) -> io::Result<Digest> {
        let mut reader = bytes;
        self.digest_reader(&mut reader)
    }

    /// Digest a file's contents without loading it into memory
    fn digest_file(&self, path: &Path) -> io::Result<Digest> {
        let mut file = std::fs::File::open(path)?;
        self.digest_reader(&mut file)
    }
}

fn stream_into<D: sha2::Digest>(mut hasher: D, reader: &mut dyn Read) -> io::Result<Vec<u8>> {
    let mut buf = [0_u8; 64 * 1024];
    loop {
        let read = reader.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(hasher.finalize().to_vec())
}

/// SHA-256 calculator (`sha256`)
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Calculator;

impl DigestCalculator for Sha256Calculator {
    fn algorithm(&self) -> &str {
        "sha256"
    }

    fn digest_reader(&self, reader: &mut dyn Read) -> io::Result<Digest> {
        let bytes = stream_into(<Sha256 as sha2::Digest>::new(), reader)?;
        Digest::from_bytes(self.algorithm(), bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
    }
}

/// SHA-512 calculator (`sha512`), the OCFL default
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha512Calculator;

impl DigestCalculator for Sha512Calculator {
    fn algorithm(&self) -> &str {
        "sha512"
    }

    fn digest_reader(&self, reader: &mut dyn Read) -> io::Result<Digest> {
        let bytes = stream_into(<Sha512 as sha2::Digest>::new(), reader)?;
        Digest::from_bytes(self.algorithm(), bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
    }
}

#[cfg(test)]
#[path = "digest_tests.rs"]
mod tests;

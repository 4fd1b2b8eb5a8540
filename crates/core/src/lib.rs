// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ocs-core: value types and collaborator seams for the OCFL staging cache
//!
//! This crate provides:
//! - Content digests and digest calculators
//! - Logical versioned paths
//! - The transaction context the transactional stores consult
//! - The content-type probe seam

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod content_type;
pub mod digest;
pub mod path;
pub mod transaction;

pub use content_type::{ContentTypeProbe, FixedProbe, NoProbe};
pub use digest::{Digest, DigestCalculator, DigestParseError, Sha256Calculator, Sha512Calculator};
pub use path::{PathError, Version, VersionedPath};
pub use transaction::{
    NoTransaction, SharedTransaction, TransactionContext, TransactionId, TransactionOrdinals,
};

//! Behavioral specifications for the OCFL staging stores.
//!
//! These tests drive the public store APIs against real temp directories,
//! including closing and reopening stores to exercise journal recovery.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// cache/
#[path = "specs/cache/eviction.rs"]
mod cache_eviction;
#[path = "specs/cache/recovery.rs"]
mod cache_recovery;
#[path = "specs/cache/two_phase.rs"]
mod cache_two_phase;

// rolling/
#[path = "specs/rolling/lifecycle.rs"]
mod rolling_lifecycle;

// hybrid/
#[path = "specs/hybrid/isolation.rs"]
mod hybrid_isolation;
#[path = "specs/hybrid/routing.rs"]
mod hybrid_routing;

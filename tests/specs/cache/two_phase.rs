//! Two-phase cache entry specs
//!
//! Verify that staged entries only join the cache on commit.

use crate::prelude::*;
use ocs_storage::{CopyOptions, EvictionPolicy, VersionedStore};
use similar_asserts::assert_eq;
use std::io::Write;

#[test]
fn commit_behaves_like_write() {
    let ws = Workspace::new();
    let cache = ws.cache(max_count(1));
    let first = cache.write(&vp("first"), b"first").unwrap();

    let mut writer = cache.new_cache_entry(&vp("streamed")).unwrap();
    writer.write_all(b"streamed ").unwrap();
    writer.write_all(b"in pieces").unwrap();
    let digest = writer.commit().unwrap();

    assert_eq!(digest, cache.write(&vp("again"), b"streamed in pieces").unwrap());
    assert_eq!(cached_bytes(&cache, &digest), b"streamed in pieces".to_vec());
    assert!(!cache.exists(&first));
}

#[test]
fn abort_changes_nothing() {
    let ws = Workspace::new();
    let cache = ws.cache(max_count(1));
    let existing = cache.write(&vp("existing"), b"existing").unwrap();
    let journal_before = cache.journal_stats().unwrap();

    let mut writer = cache.new_cache_entry(&vp("pending")).unwrap();
    writer.write_all(b"never kept").unwrap();
    writer.abort().unwrap();

    assert!(cache.exists(&existing));
    assert_eq!(cache.count(), 1);
    assert_eq!(cache.journal_stats().unwrap(), journal_before);
    let staging = std::fs::read_dir(ws.root("cache").join("staging")).unwrap();
    assert_eq!(staging.count(), 0);
}

#[test]
fn copy_out_of_cache_into_rolling_store() {
    let ws = Workspace::new();
    let cache = ws.cache(EvictionPolicy::Unbounded);
    let rolling = ws.rolling(EvictionPolicy::Unbounded);
    let digest = cache.write(&vp("origin"), b"cached content").unwrap();

    cache
        .copy(&digest, &vp("restored"), CopyOptions::default(), &rolling)
        .unwrap();

    assert_eq!(stored_bytes(&rolling, &vp("restored")), b"cached content".to_vec());
    let err = cache
        .copy(&digest, &vp("restored"), CopyOptions::default(), &rolling)
        .unwrap_err();
    assert!(err.is_already_exists());
    cache
        .copy(&digest, &vp("restored"), CopyOptions::replace_existing(), &rolling)
        .unwrap();
    assert!(rolling.exists(&vp("restored")).unwrap());
}

//! Cache recovery specs
//!
//! Verify that closing and reopening a cache reproduces its state.

use crate::prelude::*;
use ocs_storage::{EvictionPolicy, JournalError, StoreError};
use similar_asserts::assert_eq;
use std::io::Write;

#[test]
fn reopen_reproduces_membership_and_order() {
    let ws = Workspace::new();
    let (order, gone) = {
        let cache = ws.cache(max_count(3));
        let a = cache.write(&vp("a"), b"a").unwrap();
        let gone = cache.write(&vp("b"), b"b").unwrap();
        cache.write(&vp("c"), b"c").unwrap();
        cached_bytes(&cache, &a);
        cache.write(&vp("d"), b"d").unwrap();
        let order = cache.lru_order();
        cache.close().unwrap();
        (order, gone)
    };

    let cache = ws.cache(max_count(3));

    assert_eq!(cache.lru_order(), order);
    assert!(!cache.exists(&gone));
    for digest in &order {
        assert!(cache.exists(digest));
    }
}

#[test]
fn reopen_keeps_the_same_next_victim() {
    let ws = Workspace::new();
    let victim = {
        let cache = ws.cache(max_count(2));
        let a = cache.write(&vp("a"), b"a").unwrap();
        let b = cache.write(&vp("b"), b"b").unwrap();
        cached_bytes(&cache, &a);
        b
    };

    let cache = ws.cache(max_count(2));
    cache.write(&vp("c"), b"c").unwrap();

    assert!(!cache.exists(&victim));
    assert_eq!(cache.count(), 2);
}

#[test]
fn compaction_preserves_state_across_reopen() {
    let ws = Workspace::new();
    let (order, size_before) = {
        let cache = ws.cache(max_count(2));
        let a = cache.write(&vp("a"), b"a").unwrap();
        for i in 0u8..6 {
            cache.write(&vp("tmp"), &[b'x', i]).unwrap();
            cached_bytes(&cache, &a);
        }
        let size_before = cache.journal_stats().unwrap().bytes;
        let count = cache.count();

        cache.compact_journal().unwrap();

        assert_eq!(cache.count(), count);
        assert!(cache.journal_stats().unwrap().bytes < size_before);
        (cache.lru_order(), size_before)
    };

    let cache = ws.cache(max_count(2));
    assert_eq!(cache.lru_order(), order);
    assert!(cache.journal_stats().unwrap().bytes < size_before);
}

#[test]
fn crash_mid_append_loses_only_the_partial_record() {
    let ws = Workspace::new();
    let kept = {
        let cache = ws.cache(EvictionPolicy::Unbounded);
        cache.write(&vp("kept"), b"kept").unwrap()
    };
    let mut journal = std::fs::OpenOptions::new()
        .append(true)
        .open(ws.root("cache").join("journal.jsonl"))
        .unwrap();
    journal.write_all(b"{\"sequence\":1,\"timestamp_mic").unwrap();
    drop(journal);

    let cache = ws.cache(EvictionPolicy::Unbounded);

    assert_eq!(cache.lru_order(), vec![kept]);
    cache.write(&vp("after"), b"after").unwrap();
    assert_eq!(cache.count(), 2);
}

#[test]
fn corruption_before_valid_records_refuses_to_open() {
    let ws = Workspace::new();
    {
        let cache = ws.cache(EvictionPolicy::Unbounded);
        cache.write(&vp("a"), b"a").unwrap();
        cache.write(&vp("b"), b"b").unwrap();
    }
    let path = ws.root("cache").join("journal.jsonl");
    let content = std::fs::read_to_string(&path).unwrap();
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    lines[0] = lines[0].replace("\"add\"", "\"touch\"");
    std::fs::write(&path, lines.join("\n") + "\n").unwrap();

    let config = ocs_storage::StoreConfig::new(ws.root("cache"));
    let err = ocs_storage::CacheStore::from_config(
        &config,
        std::sync::Arc::new(ocs_core::Sha256Calculator),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        StoreError::Journal(JournalError::ChecksumMismatch { .. })
            | StoreError::Journal(JournalError::Corrupted { .. })
    ));
}

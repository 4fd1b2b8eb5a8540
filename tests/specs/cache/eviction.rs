//! Cache eviction specs
//!
//! Verify LRU eviction order under count and size limits.

use crate::prelude::*;
use ocs_storage::EvictionPolicy;
use similar_asserts::assert_eq;

#[test]
fn oldest_entry_is_evicted_past_the_limit() {
    let ws = Workspace::new();
    let cache = ws.cache(max_count(3));

    let digests: Vec<_> = (0u8..4)
        .map(|i| cache.write(&vp(&format!("file-{i}")), &[i]).unwrap())
        .collect();

    assert!(!cache.exists(&digests[0]));
    for digest in &digests[1..] {
        assert!(cache.exists(digest));
    }
    assert_eq!(cache.count(), 3);
}

#[test]
fn reading_an_entry_protects_it_from_eviction() {
    let ws = Workspace::new();
    let cache = ws.cache(max_count(2));
    let a = cache.write(&vp("a"), b"A").unwrap();
    let b = cache.write(&vp("b"), b"B").unwrap();

    cached_bytes(&cache, &a);
    let c = cache.write(&vp("c"), b"C").unwrap();

    assert!(cache.exists(&a));
    assert!(!cache.exists(&b));
    assert!(cache.exists(&c));
}

#[test]
fn max_two_walkthrough() {
    let ws = Workspace::new();
    let cache = ws.cache(max_count(2));

    let d1 = cache.write(&vp("path1"), &[1]).unwrap();
    let d2 = cache.write(&vp("path2"), &[2]).unwrap();
    assert!(cache.exists(&d1));
    assert!(cache.exists(&d2));

    let d3 = cache.write(&vp("path3"), &[3]).unwrap();
    assert!(!cache.exists(&d1));
    assert!(cache.exists(&d2));
    assert!(cache.exists(&d3));

    assert_eq!(cached_bytes(&cache, &d2), vec![2]);
    let d4 = cache.write(&vp("path4"), &[4]).unwrap();
    assert!(!cache.exists(&d3));
    assert!(cache.exists(&d2));
    assert!(cache.exists(&d4));
}

#[test]
fn identical_bytes_from_different_paths_share_a_digest() {
    let ws = Workspace::new();
    let cache = ws.cache(EvictionPolicy::Unbounded);

    let first = cache.write(&vp("one.txt"), b"same bytes").unwrap();
    let second = cache.write(&vp("two.txt"), b"same bytes").unwrap();

    assert_eq!(first, second);
    assert_eq!(cache.count(), 1);
    assert_eq!(cached_bytes(&cache, &first), b"same bytes".to_vec());
}

#[test]
fn byte_limit_evicts_until_total_fits() {
    let ws = Workspace::new();
    let cache = ws.cache(EvictionPolicy::MaxBytes { max_bytes: 8 });

    let small = cache.write(&vp("small"), b"1234").unwrap();
    let medium = cache.write(&vp("medium"), b"5678").unwrap();
    let large = cache.write(&vp("large"), b"abcdefgh").unwrap();

    assert!(!cache.exists(&small));
    assert!(!cache.exists(&medium));
    assert!(cache.exists(&large));
    assert_eq!(cache.snapshot().bytes, 8);
}

//! Rolling store specs
//!
//! Verify path-addressed writes, eviction and recovery.

use crate::prelude::*;
use ocs_storage::{CopyOptions, EvictionPolicy, VersionedStore, WriteOptions};
use similar_asserts::assert_eq;
use std::io::Write;

#[test]
fn writes_are_immediately_visible() {
    let ws = Workspace::new();
    let rolling = ws.rolling(EvictionPolicy::Unbounded);

    rolling.write(&vp("inventory.json"), b"{}").unwrap();

    assert!(rolling.exists(&vp("inventory.json")).unwrap());
    assert_eq!(stored_bytes(&rolling, &vp("inventory.json")), b"{}".to_vec());
    let physical = rolling.to_physical_path(&vp("inventory.json")).unwrap();
    assert!(physical.starts_with(ws.root("rolling")));
    assert!(physical.is_file());
}

#[test]
fn least_recently_used_path_is_evicted() {
    let ws = Workspace::new();
    let rolling = ws.rolling(max_count(2));
    rolling.write(&vp("a"), b"a").unwrap();
    rolling.write(&vp("b"), b"b").unwrap();

    stored_bytes(&rolling, &vp("a"));
    rolling.write(&vp("c"), b"c").unwrap();

    assert!(rolling.exists(&vp("a")).unwrap());
    assert!(!rolling.exists(&vp("b")).unwrap());
    assert!(rolling.exists(&vp("c")).unwrap());
}

#[test]
fn streamed_append_extends_existing_file() {
    let ws = Workspace::new();
    let rolling = ws.rolling(EvictionPolicy::Unbounded);
    rolling.write(&vp("log"), b"line 1\n").unwrap();

    let mut writer = rolling
        .new_byte_channel(&vp("log"), WriteOptions::append())
        .unwrap();
    writer.write_all(b"line 2\n").unwrap();
    writer.commit().unwrap();

    assert_eq!(stored_bytes(&rolling, &vp("log")), b"line 1\nline 2\n".to_vec());
}

#[test]
fn moves_and_deletes_survive_reopen() {
    let ws = Workspace::new();
    {
        let rolling = ws.rolling(EvictionPolicy::Unbounded);
        rolling.write(&vp("a"), b"a").unwrap();
        rolling.write(&vp("b"), b"b").unwrap();
        rolling
            .move_file(&vp("a"), &vp("renamed"), CopyOptions::default())
            .unwrap();
        rolling.delete_if_exists(&vp("b")).unwrap();
        rolling.close().unwrap();
    }

    let rolling = ws.rolling(EvictionPolicy::Unbounded);

    assert_eq!(rolling.lru_order(), vec![vp("renamed")]);
    assert_eq!(stored_bytes(&rolling, &vp("renamed")), b"a".to_vec());
    assert!(!rolling.exists(&vp("a")).unwrap());
    assert!(!rolling.exists(&vp("b")).unwrap());
}

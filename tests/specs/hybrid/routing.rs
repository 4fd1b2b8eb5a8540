//! Hybrid routing specs
//!
//! Verify which layer serves each operation.

use crate::prelude::*;
use ocs_storage::{CopyOptions, EvictionPolicy, VersionedStore};
use similar_asserts::assert_eq;

#[test]
fn physical_path_follows_first_write() {
    let ws = Workspace::new();
    let txns = Transactions::new();
    let store = ws.hybrid(&txns.context);
    store.write(&vp("f"), b"base").unwrap();
    let rolling_path = store.rolling().to_physical_path(&vp("f")).unwrap();

    txns.begin();
    assert_eq!(store.to_physical_path(&vp("f")).unwrap(), rolling_path);

    store.write(&vp("f"), b"changed").unwrap();
    let txn_path = store.to_physical_path(&vp("f")).unwrap();
    assert_ne!(txn_path, rolling_path);
    assert!(txn_path.starts_with(ws.root("transactional")));

    txns.end();
    assert_eq!(store.to_physical_path(&vp("f")).unwrap(), rolling_path);
}

#[test]
fn rolling_store_is_untouched_by_transactional_work() {
    let ws = Workspace::new();
    let txns = Transactions::new();
    let store = ws.hybrid(&txns.context);
    store.write(&vp("src"), b"payload").unwrap();
    let before = store.rolling().lru_order();

    txns.begin();
    store
        .copy(&vp("src"), &vp("copy"), CopyOptions::default())
        .unwrap();
    store
        .move_file(&vp("src"), &vp("moved"), CopyOptions::default())
        .unwrap();
    store.write(&vp("new"), b"new").unwrap();

    assert_eq!(store.rolling().lru_order(), before);
    assert_eq!(stored_bytes(store.rolling(), &vp("src")), b"payload".to_vec());
    assert_eq!(stored_bytes(&store, &vp("moved")), b"payload".to_vec());
    assert!(!store.exists(&vp("src")).unwrap());
}

#[test]
fn mutations_without_transaction_reach_rolling() {
    let ws = Workspace::new();
    let txns = Transactions::new();
    let store = ws.hybrid(&txns.context);

    store.write(&vp("a"), b"a").unwrap();
    store
        .copy(&vp("a"), &vp("b"), CopyOptions::default())
        .unwrap();

    drop(store);
    let reopened = ws.rolling(EvictionPolicy::Unbounded);
    assert_eq!(reopened.lru_order().len(), 2);
}

//! Hybrid transaction isolation specs
//!
//! Verify that a transaction's changes are private to it.

use crate::prelude::*;
use ocs_storage::{TransactionChange, VersionedStore};
use similar_asserts::assert_eq;

#[test]
fn write_is_invisible_outside_its_transaction() {
    let ws = Workspace::new();
    let txns = Transactions::new();
    let store = ws.hybrid(&txns.context);

    let t1 = txns.begin();
    store.write(&vp("p"), b"from t1").unwrap();
    assert!(store.exists(&vp("p")).unwrap());

    txns.end();
    assert!(!store.exists(&vp("p")).unwrap());

    txns.begin();
    assert!(!store.exists(&vp("p")).unwrap());

    txns.resume(t1);
    assert_eq!(stored_bytes(&store, &vp("p")), b"from t1".to_vec());
}

#[test]
fn concurrent_transactions_never_share_files() {
    let ws = Workspace::new();
    let txns = Transactions::new();
    let store = ws.hybrid(&txns.context);

    let t1 = txns.begin();
    store.write(&vp("same"), b"one").unwrap();
    let t1_path = store.to_physical_path(&vp("same")).unwrap();

    let t2 = txns.begin();
    store.write(&vp("same"), b"two").unwrap();
    let t2_path = store.to_physical_path(&vp("same")).unwrap();

    assert!(t1 < t2);
    assert_ne!(t1_path, t2_path);
    assert_eq!(std::fs::read(t1_path).unwrap(), b"one".to_vec());
    assert_eq!(std::fs::read(t2_path).unwrap(), b"two".to_vec());
}

#[test]
fn delete_shadows_rolling_only_inside_transaction() {
    let ws = Workspace::new();
    let txns = Transactions::new();
    let store = ws.hybrid(&txns.context);
    store.write(&vp("shared"), b"base").unwrap();

    let txn = txns.begin();
    assert!(store.delete_if_exists(&vp("shared")).unwrap());
    assert!(!store.exists(&vp("shared")).unwrap());

    txns.end();
    assert!(store.exists(&vp("shared")).unwrap());

    txns.resume(txn);
    assert_eq!(
        store.transactional().changes(txn).unwrap(),
        vec![TransactionChange::Deleted(vp("shared"))]
    );
}

#[test]
fn tombstones_outlive_a_restart() {
    let ws = Workspace::new();
    let txns = Transactions::new();
    let txn = {
        let store = ws.hybrid(&txns.context);
        store.write(&vp("shared"), b"base").unwrap();
        let txn = txns.begin();
        store.delete_if_exists(&vp("shared")).unwrap();
        let (rolling, _) = store.into_parts();
        rolling.close().unwrap();
        txn
    };

    let store = ws.hybrid(&txns.context);

    assert!(!store.exists(&vp("shared")).unwrap());
    assert_eq!(store.transactional().leftover_transactions().unwrap(), vec![txn]);

    store.transactional().discard(txn).unwrap();
    assert!(store.exists(&vp("shared")).unwrap());
}

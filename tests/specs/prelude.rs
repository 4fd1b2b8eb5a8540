//! Test helpers for store specs.

use ocs_core::{
    Digest, SharedTransaction, Sha256Calculator, TransactionId, TransactionOrdinals, Version,
    VersionedPath,
};
use ocs_storage::{
    CacheStore, EvictionPolicy, HybridStore, RollingStore, StoreConfig, TransactionalStore,
    VersionedStore,
};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// A temp directory holding one or more store roots
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Open the cache store at `cache/` with the given policy
    pub fn cache(&self, eviction: EvictionPolicy) -> CacheStore {
        let config = StoreConfig::new(self.root("cache")).with_eviction(eviction);
        CacheStore::from_config(&config, Arc::new(Sha256Calculator)).unwrap()
    }

    /// Open the rolling store at `rolling/` with the given policy
    pub fn rolling(&self, eviction: EvictionPolicy) -> RollingStore {
        let config = StoreConfig::new(self.root("rolling")).with_eviction(eviction);
        RollingStore::from_config(&config).unwrap()
    }

    /// Open a hybrid store over `rolling/` and `transactional/`
    pub fn hybrid(&self, txn: &SharedTransaction) -> HybridStore<SharedTransaction> {
        let transactional =
            TransactionalStore::open(&self.root("transactional"), txn.clone()).unwrap();
        HybridStore::new(self.rolling(EvictionPolicy::Unbounded), transactional)
    }
}

/// Transaction manager stand-in
pub struct Transactions {
    pub context: SharedTransaction,
    ordinals: TransactionOrdinals,
}

impl Transactions {
    pub fn new() -> Self {
        Self {
            context: SharedTransaction::new(),
            ordinals: TransactionOrdinals::new(),
        }
    }

    pub fn begin(&self) -> TransactionId {
        self.context.begin(&self.ordinals)
    }

    pub fn end(&self) {
        self.context.end();
    }

    pub fn resume(&self, txn: TransactionId) {
        self.context.set(Some(txn));
    }
}

pub fn max_count(max_entries: usize) -> EvictionPolicy {
    EvictionPolicy::MaxCount { max_entries }
}

pub fn vp(path: &str) -> VersionedPath {
    VersionedPath::new("obj-1", Version::Number(1), path).unwrap()
}

pub fn cached_bytes(store: &CacheStore, digest: &Digest) -> Vec<u8> {
    let mut buf = Vec::new();
    store
        .read_byte_channel(digest)
        .unwrap()
        .read_to_end(&mut buf)
        .unwrap();
    buf
}

pub fn stored_bytes(store: &dyn VersionedStore, path: &VersionedPath) -> Vec<u8> {
    let mut buf = Vec::new();
    store
        .read_byte_channel(path)
        .unwrap()
        .read_to_end(&mut buf)
        .unwrap();
    buf
}

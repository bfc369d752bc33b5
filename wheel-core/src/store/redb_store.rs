//! redb-backed store
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `kv` | logical key | serialized payload | every collection and tracking record |
//!
//! Each `set` / `remove` is its own write transaction and is durable once it
//! returns (redb commits with `Durability::Immediate` by default).

use super::{KvStore, StoreResult};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

/// key = logical store key, value = raw payload bytes
const KV_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

/// Durable store backed by redb
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open a database on redb's in-memory backend
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StoreResult<Self> {
        // 建表，保证只读事务可以直接 open_table
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(KV_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl KvStore for RedbStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(KV_TABLE)?;

        match table.get(key)? {
            Some(value) => Ok(Some(value.value().to_vec())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(KV_TABLE)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(KV_TABLE)?;
            table.remove(key)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(KV_TABLE)?;

        let mut keys = Vec::new();
        for result in table.range::<&str>(prefix..)? {
            let (key, _value) = result?;
            let key = key.value();
            if !key.starts_with(prefix) {
                break;
            }
            keys.push(key.to_string());
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;

    #[test]
    fn test_set_then_get() {
        contract::set_then_get(&RedbStore::open_in_memory().unwrap());
    }

    #[test]
    fn test_remove_is_idempotent() {
        contract::remove_is_idempotent(&RedbStore::open_in_memory().unwrap());
    }

    #[test]
    fn test_prefix_listing() {
        contract::prefix_listing(&RedbStore::open_in_memory().unwrap());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wheel.redb");

        {
            let store = RedbStore::open(&path).unwrap();
            store.set("quick-wheel-orders", b"[{\"id\":\"o-1\"}]").unwrap();
        }

        let store = RedbStore::open(&path).unwrap();
        assert_eq!(
            store.get("quick-wheel-orders").unwrap(),
            Some(b"[{\"id\":\"o-1\"}]".to_vec())
        );
    }
}

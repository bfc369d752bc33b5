//! Key-value store adapter
//!
//! Every collection lives under one string key as a serialized payload. A
//! write replaces the whole value; there is no patch write. Backends:
//!
//! | Backend | Durability | Use |
//! |---------|------------|-----|
//! | [`MemoryStore`] | process lifetime | tests, demos |
//! | [`RedbStore`] | file (or redb in-memory backend) | default |
//!
//! Change notification is not part of this trait; see
//! [`crate::sync::StoreContext`].

mod error;
mod memory;
mod redb_store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use redb_store::RedbStore;

/// Synchronous string-keyed byte store
///
/// `set` is immediately visible to subsequent `get` calls on any handle to
/// the same store.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    fn set(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Removing an absent key is not an error
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// All keys starting with `prefix`, sorted
    fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>>;
}

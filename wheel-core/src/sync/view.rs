//! Context-local cache of one stored collection

use super::context::{ListenerId, StoreContext};
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::AppResult;
use std::sync::Arc;

struct ViewState<T> {
    items: Vec<T>,
    /// 最近一次水合的原始字节，用于去重
    last_bytes: Option<Vec<u8>>,
    redundant_skips: u64,
    refreshes: u64,
}

impl<T: DeserializeOwned> ViewState<T> {
    fn hydrated(key: &str, bytes: Option<Vec<u8>>) -> Self {
        Self {
            items: decode(key, bytes.as_deref()),
            last_bytes: bytes,
            redundant_skips: 0,
            refreshes: 1,
        }
    }

    /// Apply a payload; returns false when it matched the cached bytes
    fn apply(&mut self, key: &str, bytes: Option<&[u8]>) -> bool {
        if self.last_bytes.as_deref() == bytes {
            self.redundant_skips += 1;
            tracing::debug!(key = %key, "Identical payload skipped");
            return false;
        }
        self.items = decode(key, bytes);
        self.last_bytes = bytes.map(<[u8]>::to_vec);
        self.refreshes += 1;
        true
    }

    /// Apply a payload written through the owning context
    fn apply_local(&mut self, key: &str, bytes: Option<&[u8]>) {
        if self.last_bytes.as_deref() == bytes {
            return;
        }
        self.items = decode(key, bytes);
        self.last_bytes = bytes.map(<[u8]>::to_vec);
    }
}

fn decode<T: DeserializeOwned>(key: &str, bytes: Option<&[u8]>) -> Vec<T> {
    match bytes {
        Some(raw) => serde_json::from_slice(raw).unwrap_or_else(|e| {
            tracing::warn!(key = %key, error = %e, "Malformed collection treated as empty");
            Vec::new()
        }),
        None => Vec::new(),
    }
}

/// Live view of a collection
///
/// Writes made through the owning context (any service, or
/// [`CollectionView::replace_local`]) update the cache synchronously. Writes
/// from other contexts arrive with the next dispatch.
pub struct CollectionView<T> {
    ctx: StoreContext,
    key: String,
    state: Arc<RwLock<ViewState<T>>>,
    listeners: [ListenerId; 2],
}

impl<T> CollectionView<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Hydrate from the store and start listening for external writes
    pub fn attach(ctx: &StoreContext, key: impl Into<String>) -> AppResult<Self> {
        let key = key.into();
        let bytes = ctx.get(&key)?;
        let state = Arc::new(RwLock::new(ViewState::hydrated(&key, bytes)));

        let external = {
            let state = state.clone();
            let key = key.clone();
            ctx.on_external_change(key.clone(), move |event| {
                state.write().apply(&key, event.value.as_deref());
            })
        };
        let local = {
            let state = state.clone();
            let key = key.clone();
            ctx.on_local_write(key.clone(), move |event| {
                state.write().apply_local(&key, event.value.as_deref());
            })
        };

        Ok(Self {
            ctx: ctx.clone(),
            key,
            state,
            listeners: [external, local],
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current items (clone)
    pub fn snapshot(&self) -> Vec<T> {
        self.state.read().items.clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().items.is_empty()
    }

    /// Replace the whole collection from this context
    pub fn replace_local(&self, items: &[T]) -> AppResult<()> {
        let bytes = serde_json::to_vec(items)?;
        self.ctx.set(&self.key, &bytes)?;
        Ok(())
    }

    /// Re-read the store (used after a dispatch gap)
    pub fn refresh(&self) -> AppResult<bool> {
        let bytes = self.ctx.get(&self.key)?;
        Ok(self.state.write().apply(&self.key, bytes.as_deref()))
    }

    /// External payloads skipped because they matched the cache
    pub fn redundant_skips(&self) -> u64 {
        self.state.read().redundant_skips
    }

    /// External payloads actually deserialized (including the initial hydrate)
    pub fn refreshes(&self) -> u64 {
        self.state.read().refreshes
    }
}

impl<T> Drop for CollectionView<T> {
    fn drop(&mut self) {
        for listener in self.listeners {
            self.ctx.off(listener);
        }
    }
}

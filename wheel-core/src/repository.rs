//! Typed access to stored payloads
//!
//! Collections are stored whole under one key and replaced whole on every
//! write. A malformed payload is logged and read as absent; it never fails the
//! caller.

use crate::sync::StoreContext;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::AppResult;
use std::marker::PhantomData;

/// Read one JSON record; absent or malformed → `None`
pub fn load_record<T: DeserializeOwned>(ctx: &StoreContext, key: &str) -> AppResult<Option<T>> {
    let Some(bytes) = ctx.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Malformed payload treated as absent");
            Ok(None)
        }
    }
}

/// Write one JSON record
pub fn save_record<T: Serialize + ?Sized>(ctx: &StoreContext, key: &str, value: &T) -> AppResult<()> {
    let bytes = serde_json::to_vec(value)?;
    ctx.set(key, &bytes)?;
    Ok(())
}

/// Raw payload stored under `key`, kept to undo a multi-key write
pub(crate) fn snapshot(ctx: &StoreContext, key: &str) -> AppResult<Option<Vec<u8>>> {
    Ok(ctx.get(key)?)
}

/// Put a [`snapshot`] back after a later write of the same operation failed
pub(crate) fn restore(ctx: &StoreContext, key: &str, prior: Option<&[u8]>) {
    let result = match prior {
        Some(bytes) => ctx.set(key, bytes),
        None => ctx.remove(key),
    };
    if let Err(e) = result {
        tracing::error!(key = %key, error = %e, "Rollback failed, record left in new state");
    }
}

/// Whole-collection repository bound to one key
#[derive(Debug, Clone, Copy)]
pub struct Collection<T> {
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Get all; absent or malformed → empty
    pub fn load(&self, ctx: &StoreContext) -> AppResult<Vec<T>> {
        Ok(load_record(ctx, self.key)?.unwrap_or_default())
    }

    /// Replace all
    pub fn save(&self, ctx: &StoreContext, items: &[T]) -> AppResult<()> {
        save_record(ctx, self.key, items)
    }

    /// Load, mutate, save
    ///
    /// Nothing is written when `f` fails. Callers that need read-modify-write
    /// atomicity within a context hold [`StoreContext::exclusive`] around it.
    pub fn update<R>(
        &self,
        ctx: &StoreContext,
        f: impl FnOnce(&mut Vec<T>) -> AppResult<R>,
    ) -> AppResult<R> {
        let mut items = self.load(ctx)?;
        let result = f(&mut items)?;
        self.save(ctx, &items)?;
        Ok(result)
    }
}

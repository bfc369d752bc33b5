//! Execution context: one customer / restaurant / rider view of the shared store
//!
//! A context writes through to the shared [`KvStore`] and then announces the
//! write on the [`ChangeBus`]. Other contexts pick the announcement up either
//! by calling [`StoreContext::pump`] (synchronous drain) or by running
//! [`StoreContext::run`] on the tokio runtime. Use one or the other per
//! context, not both.
//!
//! Local listeners ([`StoreContext::on_local_write`]) run synchronously inside
//! `set`/`remove` of the writing context, before the change is announced.

use super::bus::ChangeBus;
use crate::store::{KvStore, StoreResult};
use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};
use shared::message::{ChangeEvent, ContextId};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio_util::sync::CancellationToken;

/// Callback invoked for a change made by another context
pub type ChangeCallback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Handle returned by [`StoreContext::on_external_change`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// 监听范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// 其他上下文的写入 (经总线派发)
    External,
    /// 本上下文的写入 (写入时同步调用)
    Local,
}

struct Listener {
    key: String,
    scope: Scope,
    callback: ChangeCallback,
}

struct ContextInner {
    id: ContextId,
    name: String,
    store: Arc<dyn KvStore>,
    bus: ChangeBus,
    /// 本上下文发布的事件序号
    sequence: AtomicU64,
    next_listener: AtomicU64,
    listeners: DashMap<ListenerId, Listener>,
    receiver: Mutex<broadcast::Receiver<ChangeEvent>>,
    /// 读-改-写互斥 (同一上下文内的写操作串行)
    write_lock: Mutex<()>,
}

/// Store handle bound to one execution context
#[derive(Clone)]
pub struct StoreContext {
    inner: Arc<ContextInner>,
}

impl fmt::Debug for StoreContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreContext")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("listeners", &self.inner.listeners.len())
            .finish()
    }
}

impl StoreContext {
    pub fn new(name: impl Into<String>, store: Arc<dyn KvStore>, bus: ChangeBus) -> Self {
        let name = name.into();
        let id = ContextId::new();
        let receiver = bus.subscribe();
        tracing::info!(context = %id, name = %name, "Store context opened");

        Self {
            inner: Arc::new(ContextInner {
                id,
                name,
                store,
                bus,
                sequence: AtomicU64::new(0),
                next_listener: AtomicU64::new(1),
                listeners: DashMap::new(),
                receiver: Mutex::new(receiver),
                write_lock: Mutex::new(()),
            }),
        }
    }

    /// Sibling context on the same store and bus
    pub fn sibling(&self, name: impl Into<String>) -> Self {
        Self::new(name, self.inner.store.clone(), self.inner.bus.clone())
    }

    pub fn id(&self) -> ContextId {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.inner.store
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.inner.bus
    }

    // ========== Store access ==========

    pub fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.inner.store.get(key)
    }

    /// Write through, apply to local listeners, then announce the change
    pub fn set(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.inner.store.set(key, value)?;
        let seq = self.next_sequence();
        self.announce(ChangeEvent::set(key, value.to_vec(), self.inner.id, seq));
        Ok(())
    }

    /// Remove, apply to local listeners, then announce the change
    pub fn remove(&self, key: &str) -> StoreResult<()> {
        self.inner.store.remove(key)?;
        let seq = self.next_sequence();
        self.announce(ChangeEvent::removed(key, self.inner.id, seq));
        Ok(())
    }

    fn announce(&self, event: ChangeEvent) {
        for callback in self.callbacks_for(&event.key, Scope::Local) {
            callback(&event);
        }
        self.inner.bus.publish(event);
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        self.inner.store.keys_with_prefix(prefix)
    }

    /// Serialize read-modify-write sequences issued through this context
    pub(crate) fn exclusive(&self) -> MutexGuard<'_, ()> {
        self.inner.write_lock.lock()
    }

    fn next_sequence(&self) -> u64 {
        self.inner.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }

    // ========== Listeners ==========

    /// Register a callback for writes to `key` made by other contexts
    ///
    /// Writes made through this context never invoke its own callbacks.
    pub fn on_external_change<F>(&self, key: impl Into<String>, callback: F) -> ListenerId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.register(key.into(), Scope::External, Arc::new(callback))
    }

    /// Register a callback for writes to `key` made through this context
    ///
    /// The callback runs on the writing thread after the store accepted the
    /// write. It must not call back into a service of this context.
    pub fn on_local_write<F>(&self, key: impl Into<String>, callback: F) -> ListenerId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.register(key.into(), Scope::Local, Arc::new(callback))
    }

    fn register(&self, key: String, scope: Scope, callback: ChangeCallback) -> ListenerId {
        let id = ListenerId(self.inner.next_listener.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(
            context = %self.inner.id,
            key = %key,
            scope = ?scope,
            listener = id.0,
            "Listener registered"
        );
        self.inner.listeners.insert(
            id,
            Listener {
                key,
                scope,
                callback,
            },
        );
        id
    }

    /// Unregister a callback; returns false if it was not registered
    pub fn off(&self, listener: ListenerId) -> bool {
        self.inner.listeners.remove(&listener).is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    // ========== Dispatch ==========

    /// Drain pending bus events and run matching callbacks
    ///
    /// Returns the number of callback invocations.
    pub fn pump(&self) -> usize {
        let mut invoked = 0;
        let mut receiver = self.inner.receiver.lock();
        loop {
            match receiver.try_recv() {
                Ok(event) => invoked += self.dispatch(&event),
                Err(TryRecvError::Lagged(missed)) => {
                    tracing::warn!(
                        context = %self.inner.id,
                        missed,
                        "Change subscriber lagged, rehydrating watched keys"
                    );
                    invoked += self.rehydrate();
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        invoked
    }

    /// Dispatch loop until `cancel` (or the bus shutdown token) fires
    pub async fn run(&self, cancel: CancellationToken) {
        let mut rx = self.inner.bus.subscribe();
        let shutdown = self.inner.bus.shutdown_token().clone();
        tracing::info!(context = %self.inner.id, "Change dispatch loop started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = shutdown.cancelled() => break,
                result = rx.recv() => match result {
                    Ok(event) => {
                        self.dispatch(&event);
                    }
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!(
                            context = %self.inner.id,
                            missed,
                            "Change subscriber lagged, rehydrating watched keys"
                        );
                        self.rehydrate();
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        tracing::info!(context = %self.inner.id, "Change dispatch loop stopped");
    }

    fn dispatch(&self, event: &ChangeEvent) -> usize {
        if event.is_from(&self.inner.id) {
            return 0;
        }
        let callbacks = self.callbacks_for(&event.key, Scope::External);
        if callbacks.is_empty() {
            return 0;
        }
        tracing::debug!(
            context = %self.inner.id,
            key = %event.key,
            origin = %event.origin,
            sequence = event.sequence,
            "External change received"
        );
        // 回调在 DashMap 锁外执行，回调内可以再注册/注销
        for callback in &callbacks {
            callback(event);
        }
        callbacks.len()
    }

    /// Replay the current stored value of every watched key
    fn rehydrate(&self) -> usize {
        let keys: BTreeSet<String> = self
            .inner
            .listeners
            .iter()
            .filter(|entry| entry.value().scope == Scope::External)
            .map(|entry| entry.value().key.clone())
            .collect();

        let mut invoked = 0;
        for key in keys {
            let value = match self.inner.store.get(&key) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Rehydrate read failed");
                    continue;
                }
            };
            let event = ChangeEvent {
                key: key.clone(),
                value,
                origin: self.inner.id,
                sequence: 0,
            };
            for callback in self.callbacks_for(&key, Scope::External) {
                callback(&event);
                invoked += 1;
            }
        }
        invoked
    }

    fn callbacks_for(&self, key: &str, scope: Scope) -> Vec<ChangeCallback> {
        let mut matched: Vec<(ListenerId, ChangeCallback)> = self
            .inner
            .listeners
            .iter()
            .filter(|entry| entry.value().key == key && entry.value().scope == scope)
            .map(|entry| (*entry.key(), entry.value().callback.clone()))
            .collect();
        // 注册顺序
        matched.sort_by_key(|(id, _)| *id);
        matched.into_iter().map(|(_, cb)| cb).collect()
    }
}

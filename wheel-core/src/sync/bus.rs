//! 变更总线
//!
//! # 架构
//!
//! ```text
//! ┌──────────────┐  set/remove   ┌──────────────┐
//! │ StoreContext │ ────────────▶ │   KvStore    │  (共享)
//! │  (customer)  │               └──────────────┘
//! └──────┬───────┘
//!        │ publish(ChangeEvent)
//!        ▼
//! ┌─────────────────────────────────────────────┐
//! │  ChangeBus: broadcast::Sender<ChangeEvent>  │
//! └──────┬──────────────────────┬───────────────┘
//!        ▼                      ▼
//!  StoreContext (rider)   StoreContext (restaurant)
//!  回调 on_external_change  回调 on_external_change
//! ```
//!
//! 发布方自己的订阅也会收到事件，由 [`super::StoreContext`] 按 origin 过滤。

use shared::message::ChangeEvent;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Default capacity of the broadcast channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// 变更总线 - 同一部署内所有上下文共享
#[derive(Debug, Clone)]
pub struct ChangeBus {
    tx: broadcast::Sender<ChangeEvent>,
    /// 关闭信号令牌
    shutdown_token: CancellationToken,
}

impl ChangeBus {
    /// 创建默认容量的总线
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// 创建指定容量的总线
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// 发布变更
    ///
    /// 没有订阅者不是错误，返回收到事件的订阅者数量。
    pub fn publish(&self, event: ChangeEvent) -> usize {
        let key = event.key.clone();
        match self.tx.send(event) {
            Ok(receivers) => {
                tracing::debug!(key = %key, receivers, "Change event published");
                receivers
            }
            Err(_) => {
                tracing::debug!(key = %key, "Change event published with no subscribers");
                0
            }
        }
    }

    /// 订阅变更
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// 获取关闭令牌 (调度循环监听此令牌)
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// 通知所有调度循环退出
    pub fn shutdown(&self) {
        tracing::info!("Change bus shutting down");
        self.shutdown_token.cancel();
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

//! Platform - 一个执行上下文的全部服务

use std::sync::Arc;

use anyhow::Context as _;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::analytics::AnalyticsEngine;
use crate::config::{Config, StoreBackend};
use crate::messaging::MessagingService;
use crate::notifications::{NotificationService, PreferenceService};
use crate::orders::OrderService;
use crate::payments::{PaymentService, PaymentVerifier, SimulatedVerifier};
use crate::store::{KvStore, MemoryStore, RedbStore};
use crate::sync::{ChangeBus, StoreContext};

/// Services bound to one execution context
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置 (不可变) |
/// | ctx | 共享存储上的执行上下文 |
/// | orders | 订单与 tracking |
/// | notifications | 通知及偏好 |
/// | messaging | 会话与消息 |
/// | payments | PromptPay 支付 |
/// | analytics | 报表 |
///
/// Cloning is cheap; every service shares the same context.
///
/// ```ignore
/// let platform = Platform::open_from_config(&Config::load())?;
/// let rider_tab = platform.new_context("rider");
/// let cancel = CancellationToken::new();
/// rider_tab.start_background_tasks(cancel.clone());
/// ```
#[derive(Clone)]
pub struct Platform {
    pub config: Config,
    pub ctx: StoreContext,
    pub orders: OrderService,
    pub notifications: NotificationService,
    pub messaging: MessagingService,
    pub payments: PaymentService,
    pub analytics: AnalyticsEngine,
    verifier: Arc<dyn PaymentVerifier>,
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("config", &self.config)
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

impl Platform {
    /// Platform over an existing store and bus, configured from the environment
    pub fn open(store: Arc<dyn KvStore>, bus: ChangeBus, context_name: &str) -> Self {
        Self::with_config(Config::default(), store, bus, context_name)
    }

    pub fn with_config(
        config: Config,
        store: Arc<dyn KvStore>,
        bus: ChangeBus,
        context_name: &str,
    ) -> Self {
        let verifier: Arc<dyn PaymentVerifier> = Arc::new(SimulatedVerifier::from_config(&config));
        let ctx = StoreContext::new(context_name, store, bus);
        Self::assemble(config, ctx, verifier)
    }

    /// Build the configured backend and open the first context
    pub fn open_from_config(config: &Config) -> anyhow::Result<Self> {
        let store: Arc<dyn KvStore> = match config.store_backend {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::Redb => {
                std::fs::create_dir_all(&config.work_dir)
                    .with_context(|| format!("Failed to create work dir {}", config.work_dir))?;
                let path = config.store_path();
                let store = RedbStore::open(&path)
                    .with_context(|| format!("Failed to open store {}", path.display()))?;
                Arc::new(store)
            }
        };
        let bus = ChangeBus::with_capacity(config.sync_channel_capacity);
        tracing::info!(
            backend = ?config.store_backend,
            work_dir = %config.work_dir,
            environment = %config.environment,
            "Platform opened"
        );
        Ok(Self::with_config(config.clone(), store, bus, "main"))
    }

    /// Sibling context on the same store and bus (another tab)
    pub fn new_context(&self, name: &str) -> Self {
        Self::assemble(
            self.config.clone(),
            self.ctx.sibling(name),
            self.verifier.clone(),
        )
    }

    /// Same context with a different payment verifier
    pub fn with_verifier(&self, verifier: Arc<dyn PaymentVerifier>) -> Self {
        Self::assemble(self.config.clone(), self.ctx.clone(), verifier)
    }

    fn assemble(config: Config, ctx: StoreContext, verifier: Arc<dyn PaymentVerifier>) -> Self {
        let notifications = NotificationService::new(ctx.clone());
        let orders = OrderService::new(ctx.clone(), notifications.clone());
        let messaging = MessagingService::new(ctx.clone(), notifications.clone());
        let payments = PaymentService::new(
            ctx.clone(),
            orders.clone(),
            notifications.clone(),
            verifier.clone(),
        );
        let analytics = AnalyticsEngine::new(ctx.clone(), config.business_tz);
        Self {
            config,
            ctx,
            orders,
            notifications,
            messaging,
            payments,
            analytics,
            verifier,
        }
    }

    pub fn preferences(&self) -> &PreferenceService {
        self.notifications.preferences()
    }

    /// Spawn the change dispatch loop of this context
    ///
    /// Must be called inside a tokio runtime. Contexts driven this way should
    /// not also call [`StoreContext::pump`].
    pub fn start_background_tasks(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let ctx = self.ctx.clone();
        tokio::spawn(async move { ctx.run(cancel).await })
    }

    /// Stop every dispatch loop on the shared bus
    pub fn shutdown(&self) {
        self.ctx.bus().shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{LineItem, NewOrder};
    use shared::types::Actor;

    fn memory_config() -> Config {
        Config::with_overrides("/tmp/wheel-unused", StoreBackend::Memory)
    }

    fn order() -> NewOrder {
        NewOrder {
            restaurant_id: "rest-1".into(),
            items: vec![LineItem {
                id: "khao-soi".into(),
                name: "Khao Soi".into(),
                name_th: None,
                unit_price: 90.0,
                quantity: 1,
            }],
            delivery_fee: 20.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_open_memory_backend() {
        let platform = Platform::open_from_config(&memory_config()).unwrap();
        assert_eq!(platform.ctx.name(), "main");
        let created = platform
            .orders
            .create_order(&Actor::customer("cust-1"), order())
            .unwrap();
        assert_eq!(platform.orders.get_order(&created.id).unwrap(), created);
    }

    #[test]
    fn test_open_redb_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_overrides(dir.path().to_string_lossy(), StoreBackend::Redb);
        let platform = Platform::open_from_config(&config).unwrap();
        platform
            .orders
            .create_order(&Actor::customer("cust-1"), order())
            .unwrap();
        assert!(config.store_path().exists());
    }

    #[test]
    fn test_new_context_shares_store() {
        let main = Platform::open_from_config(&memory_config()).unwrap();
        let rider = main.new_context("rider");
        assert_ne!(main.ctx.id(), rider.ctx.id());

        let created = main
            .orders
            .create_order(&Actor::customer("cust-1"), order())
            .unwrap();
        // 直接读共享存储, 不依赖事件
        assert_eq!(rider.orders.get_order(&created.id).unwrap().id, created.id);
    }
}

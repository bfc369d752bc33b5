//! quick-wheel core - 外卖平台的本地引擎
//!
//! # 架构概述
//!
//! 多个执行上下文 (顾客 / 餐厅 / 骑手 页面) 共享同一个键值存储，
//! 写入后通过变更总线互相通知：
//!
//! - **存储** (`store`): `KvStore` trait, 内存与 redb 后端
//! - **同步** (`sync`): `ChangeBus`, `StoreContext`, `CollectionView`
//! - **订单** (`orders`): 状态机、tracking、ETA
//! - **消息/通知** (`messaging`, `notifications`)
//! - **支付** (`payments`): PromptPay 模拟校验
//! - **统计** (`analytics`): 订单事实与仪表盘指标
//!
//! # 模块结构
//!
//! ```text
//! wheel-core/src/
//! ├── config.rs       # 环境变量配置
//! ├── platform.rs     # 一个上下文的服务集合
//! ├── repository.rs   # 整集合读写
//! ├── store/          # 键值存储后端
//! ├── sync/           # 变更总线与上下文
//! ├── orders/         # 订单生命周期
//! ├── messaging/      # 会话与消息
//! ├── notifications/  # 通知与偏好
//! ├── payments/       # 支付
//! ├── analytics/      # 统计
//! └── utils/          # 日志、时间、校验
//! ```

pub mod analytics;
pub mod config;
pub mod messaging;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod platform;
pub mod repository;
pub mod store;
pub mod sync;
pub mod utils;

// Re-export 公共类型
pub use analytics::{AnalyticsEngine, AnalyticsFilter, AnalyticsReport};
pub use config::{Config, StoreBackend};
pub use messaging::MessagingService;
pub use notifications::{NotificationService, PreferenceService};
pub use orders::{OrderError, OrderService};
pub use payments::{PaymentService, PaymentTicket, PaymentVerifier, SimulatedVerifier};
pub use platform::Platform;
pub use store::{KvStore, MemoryStore, RedbStore, StoreError};
pub use sync::{ChangeBus, CollectionView, StoreContext};

// Re-export unified error types from shared
pub use shared::error::{AppError, AppResult, ErrorCode, ErrorKind};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

//! Notifications and per-user preferences
//!
//! - [`NotificationService`] - 通知存储、生成器、读取过滤
//! - [`PreferenceService`] - 用户通知开关
//! - [`generators`] - 通知模板 (纯函数)

pub mod generators;
mod preferences;
mod service;

pub use preferences::PreferenceService;
pub use service::NotificationService;

//! 工具模块 - 通用工具函数
//!
//! - [`logger`] - 日志初始化
//! - [`time`] - 业务时区换算
//! - [`validation`] - 输入校验

pub mod logger;
pub mod time;
pub mod validation;

pub use shared::error::{AppError, AppResult, ErrorCode};

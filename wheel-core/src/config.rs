use std::path::PathBuf;
use std::str::FromStr;

use chrono_tz::Tz;

use crate::utils::time::{DEFAULT_BUSINESS_TZ, parse_tz};

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// redb 文件 (默认)
    Redb,
    /// 进程内存，重启丢失
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redb" => Ok(StoreBackend::Redb),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend: {}", other)),
        }
    }
}

/// 核心配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (redb 文件、日志) |
/// | STORE_BACKEND | redb | redb / memory |
/// | STORE_FILE | wheel.redb | WORK_DIR 下的数据库文件名 |
/// | SYNC_CHANNEL_CAPACITY | 1024 | 变更总线容量 |
/// | BUSINESS_TZ | Asia/Bangkok | 统计按此时区切分日期/小时 |
/// | PAYMENT_VERIFY_DELAY_MS | 1500 | 模拟支付校验耗时 |
/// | LOG_LEVEL | info | 日志级别 |
/// | ENVIRONMENT | development | 运行环境 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/tmp/wheel STORE_BACKEND=memory cargo test
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    /// 存储后端
    pub store_backend: StoreBackend,
    /// 数据库文件名
    pub store_file: String,
    /// 广播通道容量
    pub sync_channel_capacity: usize,
    /// 业务时区
    pub business_tz: Tz,
    /// 模拟支付校验延迟 (毫秒)
    pub payment_verify_delay_ms: u64,
    /// 日志级别
    pub log_level: String,
    /// 运行环境: development | staging | production
    pub environment: String,
}

impl Config {
    /// 加载 .env 后从环境变量读取
    pub fn load() -> Self {
        dotenv::dotenv().ok();
        Self::from_env()
    }

    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            store_backend: std::env::var("STORE_BACKEND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(StoreBackend::Redb),
            store_file: std::env::var("STORE_FILE").unwrap_or_else(|_| "wheel.redb".into()),
            sync_channel_capacity: std::env::var("SYNC_CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|c: &usize| *c > 0)
                .unwrap_or(1024),
            business_tz: std::env::var("BUSINESS_TZ")
                .ok()
                .and_then(|v| match parse_tz(&v) {
                    Ok(tz) => Some(tz),
                    Err(e) => {
                        tracing::warn!(value = %v, error = %e, "Invalid BUSINESS_TZ, using default");
                        None
                    }
                })
                .unwrap_or(DEFAULT_BUSINESS_TZ),
            payment_verify_delay_ms: std::env::var("PAYMENT_VERIFY_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1500),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, store_backend: StoreBackend) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.store_backend = store_backend;
        config
    }

    /// 数据库文件完整路径
    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join(&self.store_file)
    }

    /// 日志目录
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

//! 变更总线消息类型定义
//!
//! 同一进程内多个上下文 (客户端/餐厅/骑手视图) 共享同一个存储，
//! 每次写入后通过总线广播一条 [`ChangeEvent`]，其他上下文据此刷新。

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 上下文标识 (每个 StoreContext 一个)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId(Uuid);

impl ContextId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 短格式，日志里够用
        let s = self.0.simple().to_string();
        f.write_str(&s[..8])
    }
}

/// 变更动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// 写入 (新值在 `value`)
    Set,
    /// 删除
    Removed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Set => write!(f, "set"),
            ChangeKind::Removed => write!(f, "removed"),
        }
    }
}

/// 存储变更通知
///
/// `value` 为写入后的完整字节 (删除时为 `None`)；`sequence` 在同一 origin
/// 内单调递增。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub key: String,
    pub value: Option<Vec<u8>>,
    pub origin: ContextId,
    pub sequence: u64,
}

impl ChangeEvent {
    pub fn set(key: impl Into<String>, value: Vec<u8>, origin: ContextId, sequence: u64) -> Self {
        Self {
            key: key.into(),
            value: Some(value),
            origin,
            sequence,
        }
    }

    pub fn removed(key: impl Into<String>, origin: ContextId, sequence: u64) -> Self {
        Self {
            key: key.into(),
            value: None,
            origin,
            sequence,
        }
    }

    pub fn kind(&self) -> ChangeKind {
        if self.value.is_some() {
            ChangeKind::Set
        } else {
            ChangeKind::Removed
        }
    }

    /// 是否来自指定上下文 (自身写入不回调)
    pub fn is_from(&self, context: &ContextId) -> bool {
        self.origin == *context
    }
}

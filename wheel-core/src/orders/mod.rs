//! Orders module - 订单记录、状态机、配送跟踪
//!
//! # 组件
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`machine`] | 状态转换规则、骑手绑定规则 |
//! | [`money`] | rust_decimal 金额计算、明细校验 |
//! | [`OrderService`] | 创建 / 状态变更 / 查询 / 跟踪 / 预计送达 |
//! | [`OrderQuery`] | 顾客、餐厅、骑手看板的筛选条件 |

mod error;
pub mod machine;
pub mod money;
mod query;
mod service;

pub use error::{OrderError, OrderResult};
pub use query::OrderQuery;
pub use service::OrderService;

pub(crate) use service::ORDERS;

#[cfg(test)]
mod tests;

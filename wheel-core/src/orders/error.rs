use shared::error::{AppError, ErrorCode};
use shared::order::OrderStatus;
use thiserror::Error;

/// Order lifecycle errors
#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order is already {0}")]
    OrderClosed(OrderStatus),

    #[error("A rider must be assigned before {0}")]
    RiderRequired(OrderStatus),

    #[error("Order already has rider {assigned}, got {supplied}")]
    RiderConflict { assigned: String, supplied: String },

    #[error("A rider cannot be assigned while moving to {0}")]
    RiderTooEarly(OrderStatus),

    #[error("Invalid order details: {0}")]
    InvalidDetails(String),
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, format!("Order not found: {}", id))
                    .with_detail("order_id", id)
            }
            OrderError::InvalidTransition { from, to } => {
                AppError::invalid_transition(from.as_str(), to.as_str())
            }
            OrderError::OrderClosed(status) => AppError::with_message(
                ErrorCode::InvalidTransition,
                format!("Order is already {}", status),
            )
            .with_detail("status", status.as_str()),
            OrderError::RiderRequired(status) => AppError::with_message(
                ErrorCode::RiderRequired,
                format!("A rider must be assigned before {}", status),
            )
            .with_detail("to", status.as_str()),
            OrderError::RiderConflict { assigned, supplied } => AppError::with_message(
                ErrorCode::RiderConflict,
                format!("Order already has rider {}, got {}", assigned, supplied),
            )
            .with_detail("assigned", assigned)
            .with_detail("supplied", supplied),
            OrderError::RiderTooEarly(status) => AppError::with_message(
                ErrorCode::ValidationFailed,
                format!("A rider cannot be assigned while moving to {}", status),
            )
            .with_detail("to", status.as_str()),
            OrderError::InvalidDetails(msg) => {
                AppError::with_message(ErrorCode::InvalidOrderDetails, msg)
            }
        }
    }
}

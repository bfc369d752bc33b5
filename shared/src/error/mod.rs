//! Unified error system for the quick-wheel core
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorKind`]: The four-way failure taxonomy (plus internal)
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Messaging errors
//! - 7xxx: Notification errors
//! - 8xxx: Analytics errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ErrorKind};
//!
//! let err = AppError::invalid_transition("delivered", "pending");
//! assert_eq!(err.code, ErrorCode::InvalidTransition);
//!
//! let err = AppError::validation("Missing required field")
//!     .with_detail("field", "restaurant_id");
//! assert_eq!(err.kind(), ErrorKind::ValidationFailure);
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, ErrorKind, InvalidErrorCode};
pub use types::{AppError, AppResult};

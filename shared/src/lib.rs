//! Shared types for the quick-wheel delivery core
//!
//! Domain records (orders, tracking, payments, messaging, notifications,
//! analytics facts), the unified error type, and the change event carried on
//! the sync bus. Nothing in this crate performs I/O.

pub mod analytics;
pub mod error;
pub mod message;
pub mod messaging;
pub mod notification;
pub mod order;
pub mod types;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorCode, ErrorKind};
pub use message::{ChangeEvent, ChangeKind, ContextId};
pub use serde::{Deserialize, Serialize};
pub use types::{Actor, ActorRole, GeoPoint, Timestamp};

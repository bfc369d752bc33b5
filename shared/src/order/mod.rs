//! Order domain types: records, status vocabularies, tracking, payments

pub mod payment;
pub mod status;
pub mod tracking;
pub mod types;

pub use payment::{Payment, PaymentMethod, PaymentStatus};
pub use status::{
    ALL_SIMPLE_STATUSES, ALL_STATUSES, CANONICAL_ENTRY, ORDER_STATUS_FLOW, OrderStatus,
    STATUS_MAPPING, SimpleStatus,
};
pub use tracking::{OrderTracking, StatusUpdate};
pub use types::{LineItem, NewOrder, Order};

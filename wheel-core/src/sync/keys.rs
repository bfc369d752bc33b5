//! Logical store keys
//!
//! These names are the on-disk contract; renaming one orphans stored data.

pub const ORDERS: &str = "quick-wheel-orders";
pub const ORDER_TRACKING_PREFIX: &str = "quick-wheel-order-tracking-";
pub const MESSAGE_THREADS: &str = "quick-wheel-message-threads";
pub const MESSAGES: &str = "quick-wheel-messages";
pub const NOTIFICATIONS: &str = "quick-wheel-notifications";
pub const NOTIFICATION_PREFERENCES: &str = "quick-wheel-notification-preferences";
pub const PAYMENTS: &str = "quick-wheel-payments";

pub const ORDER_ANALYTICS: &str = "quick-wheel-order-analytics";
pub const RESTAURANT_ANALYTICS: &str = "quick-wheel-restaurant-analytics";
pub const RIDER_ANALYTICS: &str = "quick-wheel-rider-analytics";
pub const CUSTOMER_ANALYTICS: &str = "quick-wheel-customer-analytics";

/// Tracking record key of one order
pub fn order_tracking(order_id: &str) -> String {
    format!("{}{}", ORDER_TRACKING_PREFIX, order_id)
}

/// Order id encoded in a tracking key
pub fn tracking_order_id(key: &str) -> Option<&str> {
    key.strip_prefix(ORDER_TRACKING_PREFIX)
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_key_round_trip() {
        let key = order_tracking("o-42");
        assert_eq!(key, "quick-wheel-order-tracking-o-42");
        assert_eq!(tracking_order_id(&key), Some("o-42"));
        assert_eq!(tracking_order_id(ORDERS), None);
        assert_eq!(tracking_order_id(ORDER_TRACKING_PREFIX), None);
    }
}

//! Predicates for `OrderService::list_orders`

use shared::order::{Order, OrderStatus};

/// Ready-made order predicates for the three dashboards
pub struct OrderQuery;

impl OrderQuery {
    pub fn for_customer(customer_id: &str) -> impl Fn(&Order) -> bool + '_ {
        move |order| order.customer_id == customer_id
    }

    pub fn for_restaurant(restaurant_id: &str) -> impl Fn(&Order) -> bool + '_ {
        move |order| order.restaurant_id == restaurant_id
    }

    pub fn for_rider(rider_id: &str) -> impl Fn(&Order) -> bool + '_ {
        move |order| order.rider_id.as_deref() == Some(rider_id)
    }

    /// Ready for pickup and not yet claimed by any rider
    pub fn available_for_riders() -> impl Fn(&Order) -> bool {
        |order| order.status == OrderStatus::ReadyForPickup && order.rider_id.is_none()
    }

    /// Bound to the rider and still on the road
    pub fn active_for_rider(rider_id: &str) -> impl Fn(&Order) -> bool + '_ {
        move |order| order.rider_id.as_deref() == Some(rider_id) && !order.is_terminal()
    }

    /// Not yet delivered or cancelled
    pub fn active() -> impl Fn(&Order) -> bool {
        |order| !order.is_terminal()
    }

    pub fn with_status(status: OrderStatus) -> impl Fn(&Order) -> bool {
        move |order| order.status == status
    }
}

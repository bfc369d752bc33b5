//! Order facts
//!
//! One [`OrderFact`] per order, derived from the order record and its tracking
//! history. Calendar fields use the business timezone.

use chrono_tz::Tz;
use std::collections::HashMap;

use crate::utils::time::{local_slot, minutes_between};
use shared::analytics::OrderFact;
use shared::order::{Order, OrderStatus, OrderTracking, PaymentMethod};
use shared::types::Timestamp;

/// Minutes from `from` to `to`; `None` unless both exist and `to` is not earlier
fn span_minutes(from: Option<Timestamp>, to: Option<Timestamp>) -> Option<f64> {
    match (from, to) {
        (Some(a), Some(b)) if b >= a => Some(minutes_between(a, b)),
        _ => None,
    }
}

pub fn order_fact(order: &Order, tracking: Option<&OrderTracking>, tz: Tz) -> OrderFact {
    let slot = local_slot(order.created_at, tz);
    let entered = |status: OrderStatus| tracking.and_then(|t| t.entered_at(status));

    let placed = entered(OrderStatus::Pending).unwrap_or(order.created_at);
    let accepted = entered(OrderStatus::Accepted);
    let preparation_start = entered(OrderStatus::Preparing);
    let preparation_end = entered(OrderStatus::ReadyForPickup);
    let pickup = entered(OrderStatus::PickedUp);
    let delivered = entered(OrderStatus::Delivered);

    let delivery_distance_km = match (&order.restaurant_coordinates, &order.delivery_coordinates) {
        (Some(from), Some(to)) => Some(from.approx_distance_km(to)),
        _ => None,
    };

    OrderFact {
        date: slot.date,
        hour: slot.hour,
        day_of_week: slot.day_of_week,
        order_id: order.id.clone(),
        restaurant_id: order.restaurant_id.clone(),
        restaurant_name: order.restaurant_name.clone(),
        customer_id: order.customer_id.clone(),
        customer_name: order.customer_name.clone(),
        rider_id: order.rider_id.clone(),
        order_amount: order.subtotal,
        delivery_fee: order.delivery_fee,
        tip: order.tip,
        total_amount: order.total_amount(),
        order_placed_time: placed,
        order_accepted_time: accepted,
        preparation_start_time: preparation_start,
        preparation_end_time: preparation_end,
        pickup_time: pickup,
        delivery_time: delivered,
        acceptance_time_minutes: span_minutes(Some(placed), accepted),
        preparation_time_minutes: span_minutes(preparation_start, preparation_end),
        delivery_time_minutes: span_minutes(pickup, delivered),
        total_time_minutes: span_minutes(Some(placed), delivered),
        status: order.status.simple(),
        payment_status: order.payment_status,
        payment_method: PaymentMethod::Promptpay,
        delivery_location: order.delivery_coordinates,
        restaurant_location: order.restaurant_coordinates,
        delivery_distance_km,
        items: order.items.clone(),
    }
}

/// Facts for every order, oldest first (ties by id)
pub fn build_order_facts(
    orders: &[Order],
    tracking: &HashMap<String, OrderTracking>,
    tz: Tz,
) -> Vec<OrderFact> {
    let mut sorted: Vec<&Order> = orders.iter().collect();
    sorted.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    sorted
        .into_iter()
        .map(|o| order_fact(o, tracking.get(&o.id), tz))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::time::DEFAULT_BUSINESS_TZ;
    use shared::order::{LineItem, PaymentStatus, SimpleStatus};
    use shared::types::GeoPoint;

    const MINUTE: i64 = 60_000;
    // 2024-03-09T18:30:00Z = 2024-03-10 01:30 Bangkok (Sunday)
    const PLACED: i64 = 1_710_009_000_000;

    fn order() -> Order {
        Order {
            id: "o-1".into(),
            customer_id: "cust-1".into(),
            customer_name: Some("Somchai".into()),
            restaurant_id: "rest-1".into(),
            restaurant_name: Some("Baan Somtum".into()),
            rider_id: Some("rider-1".into()),
            items: vec![LineItem {
                id: "somtum".into(),
                name: "Som Tum".into(),
                name_th: None,
                unit_price: 60.0,
                quantity: 2,
            }],
            subtotal: 120.0,
            delivery_fee: 30.0,
            tip: 10.0,
            status: OrderStatus::Delivered,
            payment_status: PaymentStatus::Completed,
            delivery_address: None,
            delivery_coordinates: Some(GeoPoint { lat: 13.7663, lng: 100.5018 }),
            restaurant_coordinates: Some(GeoPoint { lat: 13.7563, lng: 100.5018 }),
            created_at: PLACED,
            updated_at: PLACED,
        }
    }

    fn delivered_tracking() -> OrderTracking {
        let mut t = OrderTracking::new("o-1", OrderStatus::Pending, PLACED);
        t.record(OrderStatus::Accepted, PLACED + 2 * MINUTE);
        t.record(OrderStatus::Preparing, PLACED + 3 * MINUTE);
        t.record(OrderStatus::ReadyForPickup, PLACED + 18 * MINUTE);
        t.record(OrderStatus::RiderAssigned, PLACED + 19 * MINUTE);
        t.record(OrderStatus::PickedUp, PLACED + 25 * MINUTE);
        t.record(OrderStatus::OnTheWay, PLACED + 26 * MINUTE);
        t.record(OrderStatus::Delivered, PLACED + 45 * MINUTE);
        t
    }

    #[test]
    fn test_fact_from_full_history() {
        let fact = order_fact(&order(), Some(&delivered_tracking()), DEFAULT_BUSINESS_TZ);
        assert_eq!(fact.date, "2024-03-10");
        assert_eq!(fact.hour, 1);
        assert_eq!(fact.day_of_week, 0);
        assert_eq!(fact.status, SimpleStatus::Delivered);
        assert_eq!(fact.total_amount, 150.0);
        assert_eq!(fact.acceptance_time_minutes, Some(2.0));
        assert_eq!(fact.preparation_time_minutes, Some(15.0));
        assert_eq!(fact.delivery_time_minutes, Some(20.0));
        assert_eq!(fact.total_time_minutes, Some(45.0));
        assert!((fact.delivery_distance_km.unwrap() - 1.11).abs() < 1e-6);
    }

    #[test]
    fn test_fact_without_tracking() {
        let mut o = order();
        o.status = OrderStatus::Pending;
        o.delivery_coordinates = None;
        let fact = order_fact(&o, None, DEFAULT_BUSINESS_TZ);
        assert_eq!(fact.order_placed_time, PLACED);
        assert_eq!(fact.order_accepted_time, None);
        assert_eq!(fact.preparation_time_minutes, None);
        assert_eq!(fact.total_time_minutes, None);
        assert_eq!(fact.delivery_distance_km, None);
    }

    #[test]
    fn test_build_order_facts_sorted() {
        let mut later = order();
        later.id = "o-0".into();
        later.created_at = PLACED + MINUTE;
        let facts = build_order_facts(&[later, order()], &HashMap::new(), DEFAULT_BUSINESS_TZ);
        let ids: Vec<&str> = facts.iter().map(|f| f.order_id.as_str()).collect();
        assert_eq!(ids, vec!["o-1", "o-0"]);
    }
}

//! Analytics - 订单事实与仪表盘指标
//!
//! | Module | Role |
//! |--------|------|
//! | [`facts`] | Order + tracking → `OrderFact` |
//! | [`filter`] | `AnalyticsFilter` validation, composition, matching |
//! | [`rollups`] | restaurant / rider / customer fact rows |
//! | [`metrics`] | dashboard metrics |
//! | [`series`] | time series, trends, period comparison |
//! | [`engine`] | store-backed report and materialization |
//!
//! Everything except [`AnalyticsEngine`] is a pure function of its input.

mod engine;
pub mod facts;
mod filter;
pub mod metrics;
pub mod rollups;
pub mod series;

pub use engine::{AnalyticsEngine, AnalyticsReport, MaterializedCounts, build_report};
pub use filter::AnalyticsFilter;
pub use series::calculate_trend;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::utils::time::day_of_week;
    use shared::analytics::OrderFact;
    use shared::order::{LineItem, PaymentMethod, PaymentStatus, SimpleStatus};

    const MINUTE: i64 = 60_000;

    /// Delivered, paid order: 120 + 30 fee, 10 tip, 15 min prep, 20 min ride
    pub fn fact(
        id: &str,
        date: &str,
        restaurant: &str,
        customer: &str,
        rider: Option<&str>,
    ) -> OrderFact {
        let placed = 1_710_050_400_000;
        OrderFact {
            date: date.to_string(),
            hour: 12,
            day_of_week: day_of_week(date).unwrap(),
            order_id: id.to_string(),
            restaurant_id: restaurant.to_string(),
            restaurant_name: None,
            customer_id: customer.to_string(),
            customer_name: None,
            rider_id: rider.map(str::to_string),
            order_amount: 120.0,
            delivery_fee: 30.0,
            tip: 10.0,
            total_amount: 150.0,
            order_placed_time: placed,
            order_accepted_time: Some(placed + 2 * MINUTE),
            preparation_start_time: Some(placed + 3 * MINUTE),
            preparation_end_time: Some(placed + 18 * MINUTE),
            pickup_time: Some(placed + 25 * MINUTE),
            delivery_time: Some(placed + 45 * MINUTE),
            acceptance_time_minutes: Some(2.0),
            preparation_time_minutes: Some(15.0),
            delivery_time_minutes: Some(20.0),
            total_time_minutes: Some(45.0),
            status: SimpleStatus::Delivered,
            payment_status: PaymentStatus::Completed,
            payment_method: PaymentMethod::Promptpay,
            delivery_location: None,
            restaurant_location: None,
            delivery_distance_km: Some(1.5),
            items: vec![LineItem {
                id: "somtum".into(),
                name: "Som Tum".into(),
                name_th: None,
                unit_price: 60.0,
                quantity: 2,
            }],
        }
    }

    /// Two days, two restaurants, two customers, two riders
    ///
    /// `o-2` is an unpaid cancellation with no timings; the rest are
    /// delivered and paid.
    pub fn facts_fixture() -> Vec<OrderFact> {
        let mut o1 = fact("o-1", "2024-03-10", "rest-1", "cust-1", Some("rider-1"));
        o1.customer_name = Some("Somchai".into());
        o1.restaurant_name = Some("Baan Somtum".into());

        let mut o2 = fact("o-2", "2024-03-10", "rest-1", "cust-2", None);
        o2.hour = 13;
        o2.status = SimpleStatus::Cancelled;
        o2.payment_status = PaymentStatus::Pending;
        o2.order_accepted_time = None;
        o2.preparation_start_time = None;
        o2.preparation_end_time = None;
        o2.pickup_time = None;
        o2.delivery_time = None;
        o2.acceptance_time_minutes = None;
        o2.preparation_time_minutes = None;
        o2.delivery_time_minutes = None;
        o2.total_time_minutes = None;
        o2.delivery_distance_km = None;

        let mut o3 = fact("o-3", "2024-03-10", "rest-2", "cust-1", Some("rider-1"));
        o3.restaurant_name = Some("Khao Man Gai".into());
        o3.tip = 5.0;

        let o4 = fact("o-4", "2024-03-11", "rest-1", "cust-1", Some("rider-2"));

        vec![o1, o2, o3, o4]
    }
}

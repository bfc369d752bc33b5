//! Analytics views returned to dashboards

use super::facts::{DayCount, HourCount, ItemCount, ItemSales, RestaurantCount};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderMetrics {
    pub total_orders: u32,
    pub completed_orders: u32,
    pub cancelled_orders: u32,
    pub total_revenue: f64,
    pub average_order_value: f64,
    pub average_preparation_time: f64,
    pub average_delivery_time: f64,
    pub average_total_time: f64,
}

/// Ranked entity (id, display name, ranking value)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntity {
    pub id: String,
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestaurantMetrics {
    pub total_restaurants: u32,
    pub total_orders: u32,
    pub completed_orders: u32,
    pub cancelled_orders: u32,
    pub total_revenue: f64,
    pub average_order_value: f64,
    pub average_preparation_time: f64,
    /// Top 5, `value` = revenue
    pub top_restaurants_by_revenue: Vec<RankedEntity>,
    pub top_selling_items: Vec<ItemSales>,
    pub new_customers: u32,
    pub returning_customers: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiderMetrics {
    pub total_riders: u32,
    pub total_deliveries: u32,
    pub completed_deliveries: u32,
    pub cancelled_deliveries: u32,
    pub total_earnings: f64,
    pub total_delivery_fees: f64,
    pub total_tips: f64,
    pub average_delivery_time: f64,
    pub total_active_hours: f64,
    pub total_distance: f64,
    pub average_delivery_distance: f64,
    /// Top 5, `value` = completed deliveries
    pub top_riders_by_deliveries: Vec<RankedEntity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCustomer {
    pub id: String,
    pub name: String,
    pub spent: f64,
    pub orders: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerMetrics {
    pub total_customers: u32,
    pub total_orders: u32,
    pub total_spent: f64,
    pub average_order_value: f64,
    pub average_orders_per_customer: f64,
    pub average_spend_per_customer: f64,
    pub top_customers_by_spending: Vec<TopCustomer>,
    pub favorite_restaurants: Vec<RestaurantCount>,
    pub favorite_items: Vec<ItemCount>,
    /// 7 entries, descending by count
    pub most_popular_order_days: Vec<DayCount>,
    /// 24 entries, descending by count
    pub most_popular_order_hours: Vec<HourCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateCount {
    pub date: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateAmount {
    pub date: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Ascending by date
    pub orders_per_day: Vec<DateCount>,
    /// Ascending by date, completed payments only
    pub revenue_per_day: Vec<DateAmount>,
    /// 24 entries, hour order
    pub orders_by_hour: Vec<HourCount>,
    /// 7 entries, Sunday first
    pub orders_by_day: Vec<DayCount>,
}

/// Relative change between two periods
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    /// Absolute rounded percentage
    pub value: f64,
    pub is_positive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_end_date: Option<String>,
    pub current: OrderMetrics,
    pub previous: OrderMetrics,
    /// Distinct customers ordering in each period
    pub current_customers: u32,
    pub previous_customers: u32,
    pub orders_trend: Option<Trend>,
    pub revenue_trend: Option<Trend>,
    pub average_order_value_trend: Option<Trend>,
    pub customers_trend: Option<Trend>,
    pub delivery_time_trend: Option<Trend>,
}

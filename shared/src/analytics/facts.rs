//! Analytics fact rows
//!
//! Facts are derived from orders and tracking history; they are never edited
//! by hand. Dates are business-timezone calendar dates (`YYYY-MM-DD`), so
//! plain string comparison orders them.

use crate::order::{LineItem, PaymentMethod, PaymentStatus, SimpleStatus};
use crate::types::{GeoPoint, Timestamp};
use serde::{Deserialize, Serialize};

/// One row per order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderFact {
    // 时间维度
    pub date: String,
    /// 0-23
    pub hour: u32,
    /// 0-6, Sunday = 0
    pub day_of_week: u32,

    pub order_id: String,
    pub restaurant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_name: Option<String>,
    pub customer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    pub rider_id: Option<String>,

    // 金额
    pub order_amount: f64,
    pub delivery_fee: f64,
    pub tip: f64,
    pub total_amount: f64,

    // 时间点 (取自 tracking history)
    pub order_placed_time: Timestamp,
    pub order_accepted_time: Option<Timestamp>,
    pub preparation_start_time: Option<Timestamp>,
    pub preparation_end_time: Option<Timestamp>,
    pub pickup_time: Option<Timestamp>,
    pub delivery_time: Option<Timestamp>,

    // 派生时长 (分钟)
    pub acceptance_time_minutes: Option<f64>,
    pub preparation_time_minutes: Option<f64>,
    pub delivery_time_minutes: Option<f64>,
    pub total_time_minutes: Option<f64>,

    pub status: SimpleStatus,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_method: PaymentMethod,

    pub delivery_location: Option<GeoPoint>,
    pub restaurant_location: Option<GeoPoint>,
    pub delivery_distance_km: Option<f64>,

    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl OrderFact {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Completed
    }

    pub fn is_delivered(&self) -> bool {
        self.status == SimpleStatus::Delivered
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == SimpleStatus::Cancelled
    }
}

/// Item sales within some scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSales {
    pub item_id: String,
    pub item_name: String,
    pub quantity: u32,
    pub revenue: f64,
}

/// Per (restaurant, date) rollup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantFact {
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub date: String,
    pub day_of_week: u32,
    pub total_orders: u32,
    pub completed_orders: u32,
    pub cancelled_orders: u32,
    pub total_revenue: f64,
    pub average_order_value: f64,
    /// None when no order of the day has preparation timestamps
    pub average_preparation_time_minutes: Option<f64>,
    pub top_selling_items: Vec<ItemSales>,
    /// Customers whose first order at this restaurant falls on this date
    pub new_customers: u32,
    pub returning_customers: u32,
}

/// Per (rider, date) rollup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiderFact {
    pub rider_id: String,
    pub rider_name: String,
    pub date: String,
    pub day_of_week: u32,
    pub total_deliveries: u32,
    pub completed_deliveries: u32,
    pub cancelled_deliveries: u32,
    /// delivery_fees + tips
    pub total_earnings: f64,
    /// Fees of orders with completed payment
    pub delivery_fees: f64,
    pub tips: f64,
    pub average_delivery_time_minutes: Option<f64>,
    /// Pickup-to-delivery time, in hours
    pub total_active_time_hours: f64,
    pub total_distance_km: f64,
    pub average_delivery_distance_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantCount {
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub order_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCount {
    pub item_id: String,
    pub item_name: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub day_of_week: u32,
    pub order_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourCount {
    pub hour: u32,
    pub order_count: u32,
}

/// Per customer rollup, dated by the customer's latest order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerFact {
    pub customer_id: String,
    pub customer_name: String,
    pub date: String,
    pub total_orders: u32,
    pub total_spent: f64,
    pub average_order_value: f64,
    /// Top 3 by order count
    pub favorite_restaurants: Vec<RestaurantCount>,
    /// Top 3 by quantity
    pub favorite_items: Vec<ItemCount>,
    /// 7 entries, descending by count
    pub most_frequent_order_days: Vec<DayCount>,
    /// 24 entries, descending by count
    pub most_frequent_order_hours: Vec<HourCount>,
}

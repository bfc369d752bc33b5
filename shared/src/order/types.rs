//! Order records

use super::payment::PaymentStatus;
use super::status::OrderStatus;
use crate::types::{GeoPoint, Timestamp};
use serde::{Deserialize, Serialize};

/// Ordered line item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    /// Menu item ID
    pub id: String,
    /// Item name
    pub name: String,
    /// Thai display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_th: Option<String>,
    /// Unit price
    pub unit_price: f64,
    /// Quantity
    pub quantity: u32,
}

/// One food order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Order ID (opaque)
    pub id: String,
    /// Customer ID (the actor that placed the order)
    pub customer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    /// Restaurant ID
    pub restaurant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_name: Option<String>,
    /// Rider ID (None until a rider is assigned)
    #[serde(default)]
    pub rider_id: Option<String>,
    /// Ordered line items
    pub items: Vec<LineItem>,
    /// Sum of unit_price × quantity
    pub subtotal: f64,
    /// Delivery fee
    pub delivery_fee: f64,
    /// Rider tip
    #[serde(default)]
    pub tip: f64,
    /// Order status
    pub status: OrderStatus,
    /// Payment status
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    /// Delivery coordinates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_coordinates: Option<GeoPoint>,
    /// Restaurant coordinates (for distance statistics)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_coordinates: Option<GeoPoint>,
    /// Creation timestamp
    pub created_at: Timestamp,
    /// Last update timestamp
    pub updated_at: Timestamp,
}

impl Order {
    /// Amount charged to the customer (subtotal + delivery fee)
    pub fn total_amount(&self) -> f64 {
        self.subtotal + self.delivery_fee
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Order details supplied by the customer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewOrder {
    pub restaurant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    pub items: Vec<LineItem>,
    pub delivery_fee: f64,
    #[serde(default)]
    pub tip: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_coordinates: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_coordinates: Option<GeoPoint>,
}

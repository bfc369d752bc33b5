//! Order status vocabularies
//!
//! The canonical lifecycle is the linear chain
//!
//! ```text
//! pending → accepted → preparing → ready_for_pickup → rider_assigned
//!         → picked_up → on_the_way → delivered
//! ```
//!
//! with `cancelled` reachable from every non-terminal state. Restaurant and
//! rider screens speak a collapsed vocabulary ([`SimpleStatus`]); the two are
//! tied together by [`STATUS_MAPPING`] and [`CANONICAL_ENTRY`], never by
//! ad-hoc string matching.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending = 0,
    Accepted = 1,
    Preparing = 2,
    ReadyForPickup = 3,
    RiderAssigned = 4,
    PickedUp = 5,
    OnTheWay = 6,
    Delivered = 7,
    Cancelled = 8,
}

/// The forward chain, in order
pub const ORDER_STATUS_FLOW: [OrderStatus; 8] = [
    OrderStatus::Pending,
    OrderStatus::Accepted,
    OrderStatus::Preparing,
    OrderStatus::ReadyForPickup,
    OrderStatus::RiderAssigned,
    OrderStatus::PickedUp,
    OrderStatus::OnTheWay,
    OrderStatus::Delivered,
];

/// Every canonical status, chain first then `cancelled`
pub const ALL_STATUSES: [OrderStatus; 9] = [
    OrderStatus::Pending,
    OrderStatus::Accepted,
    OrderStatus::Preparing,
    OrderStatus::ReadyForPickup,
    OrderStatus::RiderAssigned,
    OrderStatus::PickedUp,
    OrderStatus::OnTheWay,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
];

impl OrderStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Preparing => "preparing",
            OrderStatus::ReadyForPickup => "ready_for_pickup",
            OrderStatus::RiderAssigned => "rider_assigned",
            OrderStatus::PickedUp => "picked_up",
            OrderStatus::OnTheWay => "on_the_way",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Designated successor in the chain (`None` for terminal states)
    pub fn next(&self) -> Option<OrderStatus> {
        let idx = ORDER_STATUS_FLOW.iter().position(|s| s == self)?;
        ORDER_STATUS_FLOW.get(idx + 1).copied()
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Rider-bound states: rider_assigned and everything after it, up to delivery
    pub const fn requires_rider(&self) -> bool {
        matches!(
            self,
            OrderStatus::RiderAssigned
                | OrderStatus::PickedUp
                | OrderStatus::OnTheWay
                | OrderStatus::Delivered
        )
    }

    /// Transition rule: the chain successor, or `cancelled` from a non-terminal state
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        if target == OrderStatus::Cancelled {
            return !self.is_terminal();
        }
        self.next() == Some(target)
    }

    /// Collapsed vocabulary of this status
    pub fn simple(&self) -> SimpleStatus {
        STATUS_MAPPING[*self as usize].1
    }

    /// Customer-facing label
    pub const fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Order Placed",
            OrderStatus::Accepted => "Order Accepted",
            OrderStatus::Preparing => "Preparing Food",
            OrderStatus::ReadyForPickup => "Ready for Pickup",
            OrderStatus::RiderAssigned => "Rider Assigned",
            OrderStatus::PickedUp => "Order Picked Up",
            OrderStatus::OnTheWay => "On the Way to You",
            OrderStatus::Delivered => "Order Delivered",
            OrderStatus::Cancelled => "Order Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_STATUSES
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                AppError::validation(format!("Unknown order status: {}", s))
                    .with_detail("status", s)
            })
    }
}

/// Collapsed status used by restaurant / rider screens
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SimpleStatus {
    Pending = 0,
    Accepted = 1,
    Preparing = 2,
    Ready = 3,
    PickedUp = 4,
    Delivered = 5,
    Cancelled = 6,
}

pub const ALL_SIMPLE_STATUSES: [SimpleStatus; 7] = [
    SimpleStatus::Pending,
    SimpleStatus::Accepted,
    SimpleStatus::Preparing,
    SimpleStatus::Ready,
    SimpleStatus::PickedUp,
    SimpleStatus::Delivered,
    SimpleStatus::Cancelled,
];

/// Canonical → simple mapping, indexed by `OrderStatus as usize`
pub const STATUS_MAPPING: [(OrderStatus, SimpleStatus); 9] = [
    (OrderStatus::Pending, SimpleStatus::Pending),
    (OrderStatus::Accepted, SimpleStatus::Accepted),
    (OrderStatus::Preparing, SimpleStatus::Preparing),
    (OrderStatus::ReadyForPickup, SimpleStatus::Ready),
    (OrderStatus::RiderAssigned, SimpleStatus::Ready),
    (OrderStatus::PickedUp, SimpleStatus::PickedUp),
    (OrderStatus::OnTheWay, SimpleStatus::PickedUp),
    (OrderStatus::Delivered, SimpleStatus::Delivered),
    (OrderStatus::Cancelled, SimpleStatus::Cancelled),
];

/// Simple → canonical entry state, indexed by `SimpleStatus as usize`
///
/// Each simple status maps to the first canonical state that collapses to it.
pub const CANONICAL_ENTRY: [(SimpleStatus, OrderStatus); 7] = [
    (SimpleStatus::Pending, OrderStatus::Pending),
    (SimpleStatus::Accepted, OrderStatus::Accepted),
    (SimpleStatus::Preparing, OrderStatus::Preparing),
    (SimpleStatus::Ready, OrderStatus::ReadyForPickup),
    (SimpleStatus::PickedUp, OrderStatus::PickedUp),
    (SimpleStatus::Delivered, OrderStatus::Delivered),
    (SimpleStatus::Cancelled, OrderStatus::Cancelled),
];

impl SimpleStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SimpleStatus::Pending => "pending",
            SimpleStatus::Accepted => "accepted",
            SimpleStatus::Preparing => "preparing",
            SimpleStatus::Ready => "ready",
            SimpleStatus::PickedUp => "picked_up",
            SimpleStatus::Delivered => "delivered",
            SimpleStatus::Cancelled => "cancelled",
        }
    }

    /// Canonical state a presentation-level status enters
    pub fn canonical(&self) -> OrderStatus {
        CANONICAL_ENTRY[*self as usize].1
    }
}

impl fmt::Display for SimpleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimpleStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_SIMPLE_STATUSES
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                AppError::validation(format!("Unknown status: {}", s)).with_detail("status", s)
            })
    }
}

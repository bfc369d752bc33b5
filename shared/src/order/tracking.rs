//! Per-order tracking record

use super::status::OrderStatus;
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

/// One status change
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: OrderStatus,
    pub timestamp: Timestamp,
}

/// Append-only status history plus ETA for one order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderTracking {
    pub order_id: String,
    pub current_status: OrderStatus,
    pub status_history: Vec<StatusUpdate>,
    #[serde(default)]
    pub estimated_arrival_time: Option<Timestamp>,
}

impl OrderTracking {
    /// Tracking record whose history starts with `status` at `at`
    pub fn new(order_id: impl Into<String>, status: OrderStatus, at: Timestamp) -> Self {
        Self {
            order_id: order_id.into(),
            current_status: status,
            status_history: vec![StatusUpdate {
                status,
                timestamp: at,
            }],
            estimated_arrival_time: None,
        }
    }

    /// Append a status change
    ///
    /// The timestamp is clamped to the last entry so history never goes
    /// backwards when clocks of two contexts disagree.
    pub fn record(&mut self, status: OrderStatus, now: Timestamp) -> StatusUpdate {
        let timestamp = self
            .status_history
            .last()
            .map_or(now, |last| now.max(last.timestamp));
        let update = StatusUpdate { status, timestamp };
        self.status_history.push(update);
        self.current_status = status;
        update
    }

    /// First time the order entered `status`
    pub fn entered_at(&self, status: OrderStatus) -> Option<Timestamp> {
        self.status_history
            .iter()
            .find(|u| u.status == status)
            .map(|u| u.timestamp)
    }

    /// History non-decreasing and last entry equal to current status
    pub fn is_consistent(&self) -> bool {
        let monotonic = self
            .status_history
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp);
        let last_matches = self
            .status_history
            .last()
            .is_some_and(|u| u.status == self.current_status);
        monotonic && last_matches
    }
}

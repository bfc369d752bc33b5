//! AnalyticsEngine - 从订单与 tracking 计算报表
//!
//! ```text
//! ORDERS + tracking-* ──▶ OrderFact ──filter──▶ rollups ──▶ metrics / series
//!                                      └──────▶ period comparison (unfiltered facts)
//! ```
//!
//! Reports never write. [`AnalyticsEngine::materialize`] is the only writer of
//! the four fact collections and always recomputes them from scratch.

use std::collections::HashMap;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::facts::build_order_facts;
use super::filter::AnalyticsFilter;
use super::metrics::{customer_metrics, order_metrics, restaurant_metrics, rider_metrics};
use super::rollups::{customer_facts, restaurant_facts, rider_facts};
use super::series::{period_comparison, time_series};
use crate::orders::ORDERS;
use crate::repository::{load_record, save_record};
use crate::sync::{StoreContext, keys};
use shared::analytics::{
    CustomerFact, CustomerMetrics, OrderFact, OrderMetrics, PeriodComparison, RestaurantFact,
    RestaurantMetrics, RiderFact, RiderMetrics, TimeSeries,
};
use shared::error::AppResult;
use shared::order::OrderTracking;

/// Every analytics view for one filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub filter: AnalyticsFilter,
    pub order_facts: Vec<OrderFact>,
    pub restaurant_facts: Vec<RestaurantFact>,
    pub rider_facts: Vec<RiderFact>,
    pub customer_facts: Vec<CustomerFact>,
    pub order_metrics: OrderMetrics,
    pub restaurant_metrics: RestaurantMetrics,
    pub rider_metrics: RiderMetrics,
    pub customer_metrics: CustomerMetrics,
    pub time_series: TimeSeries,
    pub comparison: PeriodComparison,
}

/// Row counts written by [`AnalyticsEngine::materialize`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializedCounts {
    pub orders: usize,
    pub restaurants: usize,
    pub riders: usize,
    pub customers: usize,
}

/// Assemble a report from already-derived facts
pub fn build_report(all: &[OrderFact], filter: &AnalyticsFilter) -> AnalyticsReport {
    let facts = filter.apply(all);
    let restaurants = restaurant_facts(&facts);
    let riders = rider_facts(&facts);
    let customers = customer_facts(&facts);

    AnalyticsReport {
        filter: filter.clone(),
        order_metrics: order_metrics(&facts),
        restaurant_metrics: restaurant_metrics(&facts, &restaurants),
        rider_metrics: rider_metrics(&riders),
        customer_metrics: customer_metrics(&facts, &customers),
        time_series: time_series(&facts),
        comparison: period_comparison(all, filter),
        restaurant_facts: restaurants,
        rider_facts: riders,
        customer_facts: customers,
        order_facts: facts,
    }
}

#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    ctx: StoreContext,
    tz: Tz,
}

impl AnalyticsEngine {
    pub fn new(ctx: StoreContext, tz: Tz) -> Self {
        Self { ctx, tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Order facts for every stored order
    ///
    /// Tracking that is missing, malformed or keyed to another order is
    /// ignored; the order still yields a fact without lifecycle timestamps.
    pub fn order_facts(&self) -> AppResult<Vec<OrderFact>> {
        let orders = ORDERS.load(&self.ctx)?;
        let mut tracking = HashMap::with_capacity(orders.len());
        for order in &orders {
            let record: Option<OrderTracking> =
                load_record(&self.ctx, &keys::order_tracking(&order.id))?;
            if let Some(t) = record.filter(|t| t.order_id == order.id) {
                tracking.insert(order.id.clone(), t);
            }
        }
        Ok(build_order_facts(&orders, &tracking, self.tz))
    }

    pub fn report(&self, filter: &AnalyticsFilter) -> AppResult<AnalyticsReport> {
        filter.validate()?;
        let facts = self.order_facts()?;
        let report = build_report(&facts, filter);
        tracing::debug!(
            context = %self.ctx.name(),
            facts = facts.len(),
            matched = report.order_facts.len(),
            "Analytics report built"
        );
        Ok(report)
    }

    /// Recompute and store the four fact collections
    pub fn materialize(&self) -> AppResult<MaterializedCounts> {
        let _guard = self.ctx.exclusive();
        let facts = self.order_facts()?;
        let restaurants = restaurant_facts(&facts);
        let riders = rider_facts(&facts);
        let customers = customer_facts(&facts);

        save_record(&self.ctx, keys::ORDER_ANALYTICS, &facts)?;
        save_record(&self.ctx, keys::RESTAURANT_ANALYTICS, &restaurants)?;
        save_record(&self.ctx, keys::RIDER_ANALYTICS, &riders)?;
        save_record(&self.ctx, keys::CUSTOMER_ANALYTICS, &customers)?;

        let counts = MaterializedCounts {
            orders: facts.len(),
            restaurants: restaurants.len(),
            riders: riders.len(),
            customers: customers.len(),
        };
        tracing::info!(
            context = %self.ctx.name(),
            orders = counts.orders,
            restaurants = counts.restaurants,
            riders = counts.riders,
            customers = counts.customers,
            "Analytics facts materialized"
        );
        Ok(counts)
    }

    /// Previously materialized order facts; empty when never materialized
    pub fn stored_order_facts(&self) -> AppResult<Vec<OrderFact>> {
        Ok(load_record(&self.ctx, keys::ORDER_ANALYTICS)?.unwrap_or_default())
    }
}

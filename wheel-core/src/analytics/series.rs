//! Time series, trends and period comparison

use std::collections::{BTreeMap, BTreeSet};

use super::filter::AnalyticsFilter;
use super::metrics::order_metrics;
use crate::orders::money::sum_money;
use shared::analytics::{
    DateAmount, DateCount, DayCount, HourCount, OrderFact, PeriodComparison, TimeSeries, Trend,
};

pub fn time_series(facts: &[OrderFact]) -> TimeSeries {
    let mut per_day: BTreeMap<&str, u32> = BTreeMap::new();
    let mut revenue: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    let mut hours = [0u32; 24];
    let mut days = [0u32; 7];

    for f in facts {
        *per_day.entry(f.date.as_str()).or_default() += 1;
        if f.is_paid() {
            revenue.entry(f.date.as_str()).or_default().push(f.total_amount);
        }
        if let Some(h) = hours.get_mut(f.hour as usize) {
            *h += 1;
        }
        if let Some(d) = days.get_mut(f.day_of_week as usize) {
            *d += 1;
        }
    }

    TimeSeries {
        orders_per_day: per_day
            .into_iter()
            .map(|(date, count)| DateCount {
                date: date.to_string(),
                count,
            })
            .collect(),
        revenue_per_day: revenue
            .into_iter()
            .map(|(date, amounts)| DateAmount {
                date: date.to_string(),
                amount: sum_money(amounts),
            })
            .collect(),
        orders_by_hour: (0..24u32)
            .map(|hour| HourCount {
                hour,
                order_count: hours[hour as usize],
            })
            .collect(),
        orders_by_day: (0..7u32)
            .map(|day_of_week| DayCount {
                day_of_week,
                order_count: days[day_of_week as usize],
            })
            .collect(),
    }
}

/// Percentage change from `previous` to `current`
///
/// `None` when there is no usable baseline. Halves round toward +∞.
pub fn calculate_trend(current: f64, previous: f64) -> Option<Trend> {
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return None;
    }
    let change = ((current - previous) / previous * 100.0 + 0.5).floor();
    Some(Trend {
        value: change.abs(),
        is_positive: change >= 0.0,
    })
}

fn distinct_customers(facts: &[OrderFact]) -> u32 {
    let customers: BTreeSet<&str> = facts.iter().map(|f| f.customer_id.as_str()).collect();
    customers.len() as u32
}

/// Current filter vs. the equally long period right before it
pub fn period_comparison(all: &[OrderFact], filter: &AnalyticsFilter) -> PeriodComparison {
    let current_facts = filter.apply(all);
    let current = order_metrics(&current_facts);
    let current_customers = distinct_customers(&current_facts);
    let Some(previous_filter) = filter.previous_period() else {
        return PeriodComparison {
            current,
            current_customers,
            ..PeriodComparison::default()
        };
    };
    let previous_facts = previous_filter.apply(all);
    let previous = order_metrics(&previous_facts);
    let previous_customers = distinct_customers(&previous_facts);

    PeriodComparison {
        previous_start_date: previous_filter.start_date,
        previous_end_date: previous_filter.end_date,
        orders_trend: calculate_trend(
            f64::from(current.total_orders),
            f64::from(previous.total_orders),
        ),
        revenue_trend: calculate_trend(current.total_revenue, previous.total_revenue),
        average_order_value_trend: calculate_trend(
            current.average_order_value,
            previous.average_order_value,
        ),
        customers_trend: calculate_trend(
            f64::from(current_customers),
            f64::from(previous_customers),
        ),
        delivery_time_trend: calculate_trend(
            current.average_delivery_time,
            previous.average_delivery_time,
        ),
        current,
        previous,
        current_customers,
        previous_customers,
    }
}

//! Dashboard metrics computed from facts and rollups

use std::collections::{HashMap, HashSet};

use super::rollups::{
    day_histogram, hour_histogram, item_counts, item_sales, mean_present, ratio,
    restaurant_counts, slot_counts,
};
use crate::orders::money::sum_money;
use shared::analytics::{
    CustomerFact, CustomerMetrics, OrderFact, OrderMetrics, RankedEntity, RestaurantFact,
    RestaurantMetrics, RiderFact, RiderMetrics, TopCustomer,
};

const TOP_RANKED: usize = 5;
const TOP_FAVORITES: usize = 3;

/// Sum `value` per entity in first-encountered order, then rank descending (stable)
fn rank<'a, T: 'a>(
    rows: impl Iterator<Item = &'a T>,
    id: impl Fn(&T) -> &str,
    name: impl Fn(&T) -> &str,
    value: impl Fn(&T) -> f64,
    money: bool,
) -> Vec<RankedEntity> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut ranked: Vec<(RankedEntity, Vec<f64>)> = Vec::new();
    for row in rows {
        match index.get(id(row)) {
            Some(&i) => ranked[i].1.push(value(row)),
            None => {
                index.insert(id(row).to_string(), ranked.len());
                ranked.push((
                    RankedEntity {
                        id: id(row).to_string(),
                        name: name(row).to_string(),
                        value: 0.0,
                    },
                    vec![value(row)],
                ));
            }
        }
    }
    let mut ranked: Vec<RankedEntity> = ranked
        .into_iter()
        .map(|(mut entity, values)| {
            entity.value = if money {
                sum_money(values)
            } else {
                values.iter().sum()
            };
            entity
        })
        .collect();
    ranked.sort_by(|a, b| b.value.total_cmp(&a.value));
    ranked.truncate(TOP_RANKED);
    ranked
}

pub fn order_metrics(facts: &[OrderFact]) -> OrderMetrics {
    let total = facts.len() as u32;
    let revenue = sum_money(facts.iter().filter(|f| f.is_paid()).map(|f| f.total_amount));
    OrderMetrics {
        total_orders: total,
        completed_orders: facts.iter().filter(|f| f.is_delivered()).count() as u32,
        cancelled_orders: facts.iter().filter(|f| f.is_cancelled()).count() as u32,
        total_revenue: revenue,
        average_order_value: ratio(revenue, total),
        average_preparation_time: mean_present(facts.iter().map(|f| f.preparation_time_minutes))
            .unwrap_or(0.0),
        average_delivery_time: mean_present(facts.iter().map(|f| f.delivery_time_minutes))
            .unwrap_or(0.0),
        average_total_time: mean_present(facts.iter().map(|f| f.total_time_minutes))
            .unwrap_or(0.0),
    }
}

pub fn restaurant_metrics(facts: &[OrderFact], rows: &[RestaurantFact]) -> RestaurantMetrics {
    let total_orders = rows.iter().map(|r| r.total_orders).sum();
    let total_revenue = sum_money(rows.iter().map(|r| r.total_revenue));
    let mut top_selling_items = item_sales(facts.iter());
    top_selling_items.truncate(TOP_RANKED);

    RestaurantMetrics {
        total_restaurants: rows
            .iter()
            .map(|r| r.restaurant_id.as_str())
            .collect::<HashSet<_>>()
            .len() as u32,
        total_orders,
        completed_orders: rows.iter().map(|r| r.completed_orders).sum(),
        cancelled_orders: rows.iter().map(|r| r.cancelled_orders).sum(),
        total_revenue,
        average_order_value: ratio(total_revenue, total_orders),
        average_preparation_time: mean_present(
            rows.iter().map(|r| r.average_preparation_time_minutes),
        )
        .unwrap_or(0.0),
        top_restaurants_by_revenue: rank(
            rows.iter(),
            |r| &r.restaurant_id,
            |r| &r.restaurant_name,
            |r| r.total_revenue,
            true,
        ),
        top_selling_items,
        new_customers: rows.iter().map(|r| r.new_customers).sum(),
        returning_customers: rows.iter().map(|r| r.returning_customers).sum(),
    }
}

pub fn rider_metrics(rows: &[RiderFact]) -> RiderMetrics {
    RiderMetrics {
        total_riders: rows
            .iter()
            .map(|r| r.rider_id.as_str())
            .collect::<HashSet<_>>()
            .len() as u32,
        total_deliveries: rows.iter().map(|r| r.total_deliveries).sum(),
        completed_deliveries: rows.iter().map(|r| r.completed_deliveries).sum(),
        cancelled_deliveries: rows.iter().map(|r| r.cancelled_deliveries).sum(),
        total_earnings: sum_money(rows.iter().map(|r| r.total_earnings)),
        total_delivery_fees: sum_money(rows.iter().map(|r| r.delivery_fees)),
        total_tips: sum_money(rows.iter().map(|r| r.tips)),
        average_delivery_time: mean_present(rows.iter().map(|r| r.average_delivery_time_minutes))
            .unwrap_or(0.0),
        total_active_hours: rows.iter().map(|r| r.total_active_time_hours).sum(),
        total_distance: rows.iter().map(|r| r.total_distance_km).sum(),
        average_delivery_distance: mean_present(
            rows.iter().map(|r| r.average_delivery_distance_km),
        )
        .unwrap_or(0.0),
        top_riders_by_deliveries: rank(
            rows.iter(),
            |r| &r.rider_id,
            |r| &r.rider_name,
            |r| f64::from(r.completed_deliveries),
            false,
        ),
    }
}

pub fn customer_metrics(facts: &[OrderFact], rows: &[CustomerFact]) -> CustomerMetrics {
    let total_customers = rows.len() as u32;
    let total_orders: u32 = rows.iter().map(|c| c.total_orders).sum();
    let total_spent = sum_money(rows.iter().map(|c| c.total_spent));

    let mut by_spend: Vec<&CustomerFact> = rows.iter().collect();
    by_spend.sort_by(|a, b| b.total_spent.total_cmp(&a.total_spent));
    let top_customers_by_spending = by_spend
        .into_iter()
        .take(TOP_RANKED)
        .map(|c| TopCustomer {
            id: c.customer_id.clone(),
            name: c.customer_name.clone(),
            spent: c.total_spent,
            orders: c.total_orders,
        })
        .collect();

    let mut favorite_restaurants = restaurant_counts(facts.iter());
    favorite_restaurants.truncate(TOP_FAVORITES);
    let mut favorite_items = item_counts(facts.iter());
    favorite_items.truncate(TOP_FAVORITES);
    let (days, hours) = slot_counts(facts.iter());

    CustomerMetrics {
        total_customers,
        total_orders,
        total_spent,
        average_order_value: ratio(total_spent, total_orders),
        average_orders_per_customer: ratio(f64::from(total_orders), total_customers),
        average_spend_per_customer: ratio(total_spent, total_customers),
        top_customers_by_spending,
        favorite_restaurants,
        favorite_items,
        most_popular_order_days: day_histogram(days),
        most_popular_order_hours: hour_histogram(hours),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::rollups::{customer_facts, restaurant_facts, rider_facts};
    use crate::analytics::test_support::{fact, facts_fixture};

    #[test]
    fn test_order_metrics() {
        let m = order_metrics(&facts_fixture());
        assert_eq!(m.total_orders, 4);
        assert_eq!(m.completed_orders, 3);
        assert_eq!(m.cancelled_orders, 1);
        assert_eq!(m.total_revenue, 450.0);
        assert_eq!(m.average_order_value, 112.5);
        // 取消的订单没有时长, 不参与平均
        assert_eq!(m.average_preparation_time, 15.0);
        assert_eq!(m.average_delivery_time, 20.0);
        assert_eq!(m.average_total_time, 45.0);
    }

    #[test]
    fn test_order_metrics_empty() {
        assert_eq!(order_metrics(&[]), OrderMetrics::default());
    }

    #[test]
    fn test_restaurant_metrics() {
        let facts = facts_fixture();
        let m = restaurant_metrics(&facts, &restaurant_facts(&facts));
        assert_eq!(m.total_restaurants, 2);
        assert_eq!(m.total_orders, 4);
        assert_eq!(m.total_revenue, 450.0);
        assert_eq!(m.top_restaurants_by_revenue[0].id, "rest-1");
        assert_eq!(m.top_restaurants_by_revenue[0].value, 300.0);
        assert_eq!(m.top_restaurants_by_revenue[1].name, "Khao Man Gai");
        assert_eq!(m.top_selling_items[0].item_id, "somtum");
        assert_eq!(m.top_selling_items[0].quantity, 8);
        assert_eq!(m.new_customers, 3);
        assert_eq!(m.returning_customers, 1);
    }

    #[test]
    fn test_rider_metrics_ties_are_stable() {
        let facts = facts_fixture();
        let m = rider_metrics(&rider_facts(&facts));
        assert_eq!(m.total_riders, 2);
        assert_eq!(m.completed_deliveries, 3);
        assert_eq!(m.total_earnings, 115.0);
        assert_eq!(m.top_riders_by_deliveries[0].id, "rider-1");
        assert_eq!(m.top_riders_by_deliveries[0].value, 2.0);

        // 同分: 先出现者在前
        let tied = vec![
            fact("a", "2024-03-10", "rest-1", "cust-1", Some("rider-b")),
            fact("b", "2024-03-10", "rest-1", "cust-1", Some("rider-a")),
        ];
        let m = rider_metrics(&rider_facts(&tied));
        let ids: Vec<&str> = m.top_riders_by_deliveries.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["rider-b", "rider-a"]);
    }

    #[test]
    fn test_customer_metrics() {
        let facts = facts_fixture();
        let m = customer_metrics(&facts, &customer_facts(&facts));
        assert_eq!(m.total_customers, 2);
        assert_eq!(m.total_orders, 4);
        assert_eq!(m.total_spent, 450.0);
        assert_eq!(m.average_orders_per_customer, 2.0);
        assert_eq!(m.average_spend_per_customer, 225.0);
        assert_eq!(m.top_customers_by_spending[0].id, "cust-1");
        assert_eq!(m.top_customers_by_spending[0].orders, 3);
        assert_eq!(m.most_popular_order_days.len(), 7);
        assert_eq!(m.most_popular_order_hours.len(), 24);
        assert_eq!(m.most_popular_order_hours[0].hour, 12);
        assert_eq!(m.most_popular_order_hours[0].order_count, 3);
    }
}

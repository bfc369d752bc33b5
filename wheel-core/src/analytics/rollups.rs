//! Restaurant / rider / customer rollups
//!
//! Groups keep first-encountered order, so results follow the order of the
//! input facts and ranking ties resolve the same way every run.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::orders::money::sum_money;
use shared::analytics::{
    CustomerFact, DayCount, HourCount, ItemCount, ItemSales, OrderFact, RestaurantCount,
    RestaurantFact, RiderFact,
};

const TOP_ITEMS: usize = 5;
const TOP_FAVORITES: usize = 3;

/// Group by key, preserving first-encountered order of keys and members
pub(crate) fn group_by<'a, K, F>(facts: &'a [OrderFact], key: F) -> Vec<(K, Vec<&'a OrderFact>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&'a OrderFact) -> Option<K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&OrderFact>)> = Vec::new();
    for fact in facts {
        let Some(k) = key(fact) else { continue };
        match index.get(&k) {
            Some(&i) => groups[i].1.push(fact),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![fact]));
            }
        }
    }
    groups
}

/// Mean of the present values
pub(crate) fn mean_present(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, n) = values
        .flatten()
        .fold((0.0, 0u32), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / f64::from(n))
}

pub(crate) fn ratio(numerator: f64, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / f64::from(denominator)
    }
}

fn count(facts: &[&OrderFact], pred: impl Fn(&OrderFact) -> bool) -> u32 {
    facts.iter().filter(|f| pred(**f)).count() as u32
}

fn paid_revenue(facts: &[&OrderFact]) -> f64 {
    sum_money(facts.iter().filter(|f| f.is_paid()).map(|f| f.total_amount))
}

/// Item sales across `facts`, descending by quantity, stable
pub(crate) fn item_sales<'a>(facts: impl Iterator<Item = &'a OrderFact>) -> Vec<ItemSales> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut sales: Vec<(ItemSales, Vec<f64>)> = Vec::new();
    for item in facts.flat_map(|f| f.items.iter()) {
        let line = item.unit_price * f64::from(item.quantity);
        match index.get(item.id.as_str()) {
            Some(&i) => {
                sales[i].0.quantity += item.quantity;
                sales[i].1.push(line);
            }
            None => {
                index.insert(item.id.as_str(), sales.len());
                sales.push((
                    ItemSales {
                        item_id: item.id.clone(),
                        item_name: item.name.clone(),
                        quantity: item.quantity,
                        revenue: 0.0,
                    },
                    vec![line],
                ));
            }
        }
    }
    let mut sales: Vec<ItemSales> = sales
        .into_iter()
        .map(|(mut s, lines)| {
            s.revenue = sum_money(lines);
            s
        })
        .collect();
    sales.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    sales
}

/// One row per (restaurant, date)
pub fn restaurant_facts(facts: &[OrderFact]) -> Vec<RestaurantFact> {
    // 每位顾客在每家餐厅的首单日期
    let mut first_visit: HashMap<(&str, &str), &str> = HashMap::new();
    for f in facts {
        let entry = first_visit
            .entry((f.restaurant_id.as_str(), f.customer_id.as_str()))
            .or_insert(f.date.as_str());
        if f.date.as_str() < *entry {
            *entry = f.date.as_str();
        }
    }

    group_by(facts, |f| Some((f.restaurant_id.clone(), f.date.clone())))
        .into_iter()
        .map(|((restaurant_id, date), group)| {
            let total = group.len() as u32;
            let revenue = paid_revenue(&group);

            let mut seen = HashSet::new();
            let (mut new_customers, mut returning_customers) = (0, 0);
            for f in &group {
                if !seen.insert(f.customer_id.as_str()) {
                    continue;
                }
                let first = first_visit
                    .get(&(f.restaurant_id.as_str(), f.customer_id.as_str()))
                    .copied()
                    .unwrap_or(f.date.as_str());
                if first == date {
                    new_customers += 1;
                } else {
                    returning_customers += 1;
                }
            }

            let mut top_selling_items = item_sales(group.iter().copied());
            top_selling_items.truncate(TOP_ITEMS);

            RestaurantFact {
                restaurant_name: group
                    .iter()
                    .find_map(|f| f.restaurant_name.clone())
                    .unwrap_or_else(|| restaurant_id.clone()),
                day_of_week: group[0].day_of_week,
                total_orders: total,
                completed_orders: count(&group, OrderFact::is_delivered),
                cancelled_orders: count(&group, OrderFact::is_cancelled),
                total_revenue: revenue,
                average_order_value: ratio(revenue, total),
                average_preparation_time_minutes: mean_present(
                    group.iter().map(|f| f.preparation_time_minutes),
                ),
                top_selling_items,
                new_customers,
                returning_customers,
                restaurant_id,
                date,
            }
        })
        .collect()
}

/// One row per (rider, date); orders without a rider are skipped
pub fn rider_facts(facts: &[OrderFact]) -> Vec<RiderFact> {
    group_by(facts, |f| f.rider_id.clone().map(|r| (r, f.date.clone())))
        .into_iter()
        .map(|((rider_id, date), group)| {
            let paid: Vec<&OrderFact> = group.iter().copied().filter(|f| f.is_paid()).collect();
            let delivery_fees = sum_money(paid.iter().map(|f| f.delivery_fee));
            let tips = sum_money(paid.iter().map(|f| f.tip));
            let active_minutes: f64 = group.iter().filter_map(|f| f.delivery_time_minutes).sum();
            let distances: Vec<f64> = group
                .iter()
                .filter(|f| f.is_delivered())
                .filter_map(|f| f.delivery_distance_km)
                .collect();

            RiderFact {
                rider_name: rider_id.clone(),
                day_of_week: group[0].day_of_week,
                total_deliveries: group.len() as u32,
                completed_deliveries: count(&group, OrderFact::is_delivered),
                cancelled_deliveries: count(&group, OrderFact::is_cancelled),
                total_earnings: sum_money([delivery_fees, tips]),
                delivery_fees,
                tips,
                average_delivery_time_minutes: mean_present(
                    group.iter().map(|f| f.delivery_time_minutes),
                ),
                total_active_time_hours: active_minutes / 60.0,
                total_distance_km: distances.iter().sum(),
                average_delivery_distance_km: mean_present(distances.iter().map(|d| Some(*d))),
                rider_id,
                date,
            }
        })
        .collect()
}

/// Restaurants by order count, descending, stable
pub(crate) fn restaurant_counts<'a>(
    facts: impl Iterator<Item = &'a OrderFact>,
) -> Vec<RestaurantCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<RestaurantCount> = Vec::new();
    for f in facts {
        match index.get(f.restaurant_id.as_str()) {
            Some(&i) => counts[i].order_count += 1,
            None => {
                index.insert(f.restaurant_id.as_str(), counts.len());
                counts.push(RestaurantCount {
                    restaurant_id: f.restaurant_id.clone(),
                    restaurant_name: f
                        .restaurant_name
                        .clone()
                        .unwrap_or_else(|| f.restaurant_id.clone()),
                    order_count: 1,
                });
            }
        }
    }
    counts.sort_by(|a, b| b.order_count.cmp(&a.order_count));
    counts
}

pub(crate) fn item_counts<'a>(facts: impl Iterator<Item = &'a OrderFact>) -> Vec<ItemCount> {
    item_sales(facts)
        .into_iter()
        .map(|s| ItemCount {
            item_id: s.item_id,
            item_name: s.item_name,
            quantity: s.quantity,
        })
        .collect()
}

/// 7 weekday counts, descending, stable from Sunday
pub(crate) fn day_histogram(counts: [u32; 7]) -> Vec<DayCount> {
    let mut days: Vec<DayCount> = (0..7u32)
        .map(|d| DayCount {
            day_of_week: d,
            order_count: counts[d as usize],
        })
        .collect();
    days.sort_by(|a, b| b.order_count.cmp(&a.order_count));
    days
}

/// 24 hour counts, descending, stable from midnight
pub(crate) fn hour_histogram(counts: [u32; 24]) -> Vec<HourCount> {
    let mut hours: Vec<HourCount> = (0..24u32)
        .map(|h| HourCount {
            hour: h,
            order_count: counts[h as usize],
        })
        .collect();
    hours.sort_by(|a, b| b.order_count.cmp(&a.order_count));
    hours
}

pub(crate) fn slot_counts<'a>(
    facts: impl Iterator<Item = &'a OrderFact>,
) -> ([u32; 7], [u32; 24]) {
    let mut days = [0u32; 7];
    let mut hours = [0u32; 24];
    for f in facts {
        if let Some(d) = days.get_mut(f.day_of_week as usize) {
            *d += 1;
        }
        if let Some(h) = hours.get_mut(f.hour as usize) {
            *h += 1;
        }
    }
    (days, hours)
}

/// One row per customer, dated by the latest order
pub fn customer_facts(facts: &[OrderFact]) -> Vec<CustomerFact> {
    group_by(facts, |f| Some(f.customer_id.clone()))
        .into_iter()
        .map(|(customer_id, group)| {
            let total = group.len() as u32;
            let spent = paid_revenue(&group);
            let date = group
                .iter()
                .map(|f| f.date.as_str())
                .max()
                .unwrap_or_default()
                .to_string();

            let mut favorite_restaurants = restaurant_counts(group.iter().copied());
            favorite_restaurants.truncate(TOP_FAVORITES);
            let mut favorite_items = item_counts(group.iter().copied());
            favorite_items.truncate(TOP_FAVORITES);
            let (days, hours) = slot_counts(group.iter().copied());

            CustomerFact {
                customer_name: group
                    .iter()
                    .find_map(|f| f.customer_name.clone())
                    .unwrap_or_else(|| customer_id.clone()),
                date,
                total_orders: total,
                total_spent: spent,
                average_order_value: ratio(spent, total),
                favorite_restaurants,
                favorite_items,
                most_frequent_order_days: day_histogram(days),
                most_frequent_order_hours: hour_histogram(hours),
                customer_id,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::{fact, facts_fixture};
    use shared::order::{PaymentStatus, SimpleStatus};

    #[test]
    fn test_restaurant_rows_per_day() {
        let rows = restaurant_facts(&facts_fixture());
        let keys: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.restaurant_id.as_str(), r.date.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("rest-1", "2024-03-10"),
                ("rest-2", "2024-03-10"),
                ("rest-1", "2024-03-11"),
            ]
        );

        let day1 = &rows[0];
        assert_eq!(day1.total_orders, 2);
        assert_eq!(day1.completed_orders, 1);
        assert_eq!(day1.cancelled_orders, 1);
        // 只计已付款订单
        assert_eq!(day1.total_revenue, 150.0);
        assert_eq!(day1.average_order_value, 75.0);
        assert_eq!(day1.average_preparation_time_minutes, Some(15.0));
        assert_eq!(day1.new_customers, 2);
        assert_eq!(day1.returning_customers, 0);

        // cust-1 第二天回到 rest-1
        let day2 = &rows[2];
        assert_eq!(day2.new_customers, 0);
        assert_eq!(day2.returning_customers, 1);
    }

    #[test]
    fn test_rider_rows() {
        let rows = rider_facts(&facts_fixture());
        assert_eq!(rows.len(), 2);
        let r = &rows[0];
        assert_eq!(r.rider_id, "rider-1");
        assert_eq!(r.date, "2024-03-10");
        assert_eq!(r.total_deliveries, 2);
        assert_eq!(r.completed_deliveries, 2);
        assert_eq!(r.delivery_fees, 60.0);
        assert_eq!(r.tips, 15.0);
        assert_eq!(r.total_earnings, 75.0);
        assert_eq!(r.average_delivery_time_minutes, Some(20.0));
        assert!((r.total_active_time_hours - 40.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_customer_rows() {
        let rows = customer_facts(&facts_fixture());
        let c1 = rows.iter().find(|c| c.customer_id == "cust-1").unwrap();
        assert_eq!(c1.customer_name, "Somchai");
        assert_eq!(c1.date, "2024-03-11");
        assert_eq!(c1.total_orders, 3);
        assert_eq!(c1.favorite_restaurants[0].restaurant_id, "rest-1");
        assert_eq!(c1.favorite_restaurants[0].order_count, 2);
        assert_eq!(c1.most_frequent_order_days.len(), 7);
        assert_eq!(c1.most_frequent_order_hours.len(), 24);
        let counted: u32 = c1.most_frequent_order_hours.iter().map(|h| h.order_count).sum();
        assert_eq!(counted, 3);
    }

    #[test]
    fn test_histogram_ties_keep_natural_order() {
        let mut counts = [0u32; 7];
        counts[3] = 2;
        counts[5] = 2;
        let days = day_histogram(counts);
        assert_eq!(days[0].day_of_week, 3);
        assert_eq!(days[1].day_of_week, 5);
        assert_eq!(days[2].day_of_week, 0);
    }

    #[test]
    fn test_unpaid_orders_earn_nothing() {
        let mut f = fact("o-9", "2024-03-10", "rest-1", "cust-1", Some("rider-1"));
        f.payment_status = PaymentStatus::Pending;
        f.status = SimpleStatus::Delivered;
        let rows = rider_facts(&[f]);
        assert_eq!(rows[0].total_earnings, 0.0);
        assert_eq!(rows[0].completed_deliveries, 1);
    }
}

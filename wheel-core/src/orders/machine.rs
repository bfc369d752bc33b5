//! Order lifecycle rules
//!
//! | From | Legal targets |
//! |------|---------------|
//! | any non-terminal | chain successor, `cancelled` |
//! | `delivered` / `cancelled` | none |
//!
//! Rider binding is checked separately by [`resolve_rider`]: `rider_assigned`
//! and every later chain state need a rider, and a rider once bound never
//! changes.

use super::error::{OrderError, OrderResult};
use shared::order::{Order, OrderStatus};

/// Check the transition rule
pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> OrderResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(OrderError::InvalidTransition { from, to })
    }
}

/// Rider the order carries after moving to `target`
///
/// - a supplied rider must not be empty
/// - a supplied rider must match an already bound one
/// - a rider may only be supplied once the target needs one (or to repeat the bound one)
/// - a rider-bound target needs a rider, supplied or already bound
pub fn resolve_rider(
    order: &Order,
    target: OrderStatus,
    supplied: Option<&str>,
) -> OrderResult<Option<String>> {
    if let Some(rider) = supplied {
        if rider.trim().is_empty() {
            return Err(OrderError::InvalidDetails(
                "rider_id must not be empty".to_string(),
            ));
        }
        match order.rider_id.as_deref() {
            Some(assigned) if assigned != rider => {
                return Err(OrderError::RiderConflict {
                    assigned: assigned.to_string(),
                    supplied: rider.to_string(),
                });
            }
            None if !target.requires_rider() => {
                return Err(OrderError::RiderTooEarly(target));
            }
            _ => {}
        }
    }

    let rider = order
        .rider_id
        .clone()
        .or_else(|| supplied.map(str::to_string));
    if target.requires_rider() && rider.is_none() {
        return Err(OrderError::RiderRequired(target));
    }
    Ok(rider)
}

/// Full pre-flight for a status change: transition rule, then rider rule
pub fn check_status_change(
    order: &Order,
    target: OrderStatus,
    supplied_rider: Option<&str>,
) -> OrderResult<Option<String>> {
    validate_transition(order.status, target)?;
    resolve_rider(order, target, supplied_rider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{ALL_STATUSES, PaymentStatus};

    fn order_at(status: OrderStatus, rider: Option<&str>) -> Order {
        Order {
            id: "o-1".into(),
            customer_id: "c-1".into(),
            customer_name: None,
            restaurant_id: "rest-1".into(),
            restaurant_name: None,
            rider_id: rider.map(str::to_string),
            items: Vec::new(),
            subtotal: 0.0,
            delivery_fee: 0.0,
            tip: 0.0,
            status,
            payment_status: PaymentStatus::Pending,
            delivery_address: None,
            delivery_coordinates: None,
            restaurant_coordinates: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_transition_rule_over_all_pairs() {
        for from in ALL_STATUSES {
            for to in ALL_STATUSES {
                let legal = from.next() == Some(to)
                    || (to == OrderStatus::Cancelled && !from.is_terminal());
                assert_eq!(
                    validate_transition(from, to).is_ok(),
                    legal,
                    "{} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_rider_required_for_assignment() {
        let order = order_at(OrderStatus::ReadyForPickup, None);
        assert_eq!(
            resolve_rider(&order, OrderStatus::RiderAssigned, None),
            Err(OrderError::RiderRequired(OrderStatus::RiderAssigned))
        );
        assert_eq!(
            resolve_rider(&order, OrderStatus::RiderAssigned, Some("r-1")),
            Ok(Some("r-1".to_string()))
        );
    }

    #[test]
    fn test_bound_rider_carries_forward() {
        let order = order_at(OrderStatus::RiderAssigned, Some("r-1"));
        assert_eq!(
            resolve_rider(&order, OrderStatus::PickedUp, None),
            Ok(Some("r-1".to_string()))
        );
        assert_eq!(
            resolve_rider(&order, OrderStatus::PickedUp, Some("r-1")),
            Ok(Some("r-1".to_string()))
        );
    }

    #[test]
    fn test_conflicting_rider_rejected() {
        let order = order_at(OrderStatus::RiderAssigned, Some("r-1"));
        assert!(matches!(
            resolve_rider(&order, OrderStatus::PickedUp, Some("r-2")),
            Err(OrderError::RiderConflict { .. })
        ));
    }

    #[test]
    fn test_rider_before_assignment_rejected() {
        let order = order_at(OrderStatus::Pending, None);
        assert_eq!(
            resolve_rider(&order, OrderStatus::Accepted, Some("r-1")),
            Err(OrderError::RiderTooEarly(OrderStatus::Accepted))
        );
        assert!(matches!(
            resolve_rider(&order, OrderStatus::Accepted, Some("  ")),
            Err(OrderError::InvalidDetails(_))
        ));
    }

    #[test]
    fn test_cancel_keeps_bound_rider() {
        let order = order_at(OrderStatus::OnTheWay, Some("r-1"));
        assert_eq!(
            check_status_change(&order, OrderStatus::Cancelled, None),
            Ok(Some("r-1".to_string()))
        );
    }

    #[test]
    fn test_transition_checked_before_rider() {
        let order = order_at(OrderStatus::Pending, None);
        assert!(matches!(
            check_status_change(&order, OrderStatus::RiderAssigned, None),
            Err(OrderError::InvalidTransition { .. })
        ));
    }
}

use super::*;
use shared::notification::{Channel, NotificationCategory};

// ========================================================================
// 完整配送流程: pending → ... → delivered
// ========================================================================
#[test]
fn test_happy_path_delivery() {
    let svc = create_test_service();
    let order = place_order(&svc);

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.customer_id, "cust-1");
    assert_eq!(order.customer_name.as_deref(), Some("Somchai"));
    assert_eq!(order.subtotal, 165.0); // 60 × 2 + 45
    assert_eq!(order.total_amount(), 195.0);
    assert_eq!(order.payment_status, PaymentStatus::Pending);

    let order = advance_until(&svc, &order.id, OrderStatus::Delivered);
    assert_eq!(order.rider_id.as_deref(), Some("rider-1"));

    let tracking = svc.tracking(&order.id).unwrap();
    let statuses: Vec<OrderStatus> = tracking.status_history.iter().map(|u| u.status).collect();
    assert_eq!(statuses, shared::order::ORDER_STATUS_FLOW.to_vec());
    assert!(tracking.is_consistent());
    assert_eq!(tracking.current_status, OrderStatus::Delivered);

    // 每次状态变更通知顾客一次
    let notifications = NotificationService::new(svc.context().clone());
    let inbox = notifications.for_recipient("cust-1").unwrap();
    assert_eq!(inbox.len(), 7);
    assert!(inbox.iter().all(|n| n.category == NotificationCategory::OrderUpdate));
    assert!(inbox.iter().any(|n| n.title == "Order Delivered"));
    assert_eq!(
        notifications.unread_count("cust-1", Channel::InApp).unwrap(),
        7
    );
}

#[test]
fn test_cancellation_flow() {
    let svc = create_test_service();
    let order = place_order(&svc);
    advance_until(&svc, &order.id, OrderStatus::Preparing);

    let order = svc.cancel_order(&customer(), &order.id).unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert!(order.is_terminal());

    let tracking = svc.tracking(&order.id).unwrap();
    let last = tracking.status_history.last().unwrap();
    assert_eq!(last.status, OrderStatus::Cancelled);
    assert_eq!(tracking.status_history.len(), 4);
    assert!(tracking.is_consistent());

    let notifications = NotificationService::new(svc.context().clone());
    let latest = &notifications.for_recipient("cust-1").unwrap()[0];
    assert_eq!(latest.title, "Order Cancelled");
    assert_eq!(
        latest.content,
        "Your order from Baan Somtum has been cancelled."
    );
}

#[test]
fn test_create_order_validation() {
    let svc = create_test_service();

    let mut input = simple_order();
    input.items.clear();
    let err = svc.create_order(&customer(), input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailure);

    let mut input = simple_order();
    input.items[0].quantity = 0;
    assert!(svc.create_order(&customer(), input).is_err());

    let mut input = simple_order();
    input.delivery_fee = -5.0;
    assert!(svc.create_order(&customer(), input).is_err());

    let mut input = simple_order();
    input.restaurant_id = "  ".to_string();
    assert!(svc.create_order(&customer(), input).is_err());

    assert!(svc.list_orders().unwrap().is_empty());
}

#[test]
fn test_list_orders_newest_first_and_queries() {
    let svc = create_test_service();
    let first = place_order(&svc);
    let second = place_order(&svc);
    let mut other = simple_order();
    other.restaurant_id = "rest-2".to_string();
    let third = svc
        .create_order(&Actor::customer("cust-2"), other)
        .unwrap();

    let ids: Vec<String> = svc.list_orders().unwrap().into_iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![third.id.clone(), second.id.clone(), first.id.clone()]);

    let mine = svc.list_orders_where(OrderQuery::for_customer("cust-1")).unwrap();
    assert_eq!(mine.len(), 2);
    let rest2 = svc.list_orders_where(OrderQuery::for_restaurant("rest-2")).unwrap();
    assert_eq!(rest2.len(), 1);

    advance_until(&svc, &first.id, OrderStatus::ReadyForPickup);
    let available = svc
        .list_orders_where(OrderQuery::available_for_riders())
        .unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].id, first.id);

    advance_until(&svc, &first.id, OrderStatus::PickedUp);
    assert!(
        svc.list_orders_where(OrderQuery::available_for_riders())
            .unwrap()
            .is_empty()
    );
    let active = svc
        .list_orders_where(OrderQuery::active_for_rider("rider-1"))
        .unwrap();
    assert_eq!(active.len(), 1);

    advance_until(&svc, &first.id, OrderStatus::Delivered);
    assert!(
        svc.list_orders_where(OrderQuery::active_for_rider("rider-1"))
            .unwrap()
            .is_empty()
    );
    assert_eq!(
        svc.list_orders_where(OrderQuery::for_rider("rider-1"))
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_missing_tracking_is_rebuilt() {
    let svc = create_test_service();
    let order = place_order(&svc);
    let order = advance_until(&svc, &order.id, OrderStatus::Preparing);

    svc.context()
        .remove(&keys::order_tracking(&order.id))
        .unwrap();
    let tracking = svc.tracking(&order.id).unwrap();
    assert_eq!(tracking.current_status, OrderStatus::Preparing);
    assert_eq!(tracking.status_history.len(), 1);
    assert_eq!(tracking.status_history[0].timestamp, order.updated_at);

    // 重建后的记录已写回
    assert!(
        svc.context()
            .get(&keys::order_tracking(&order.id))
            .unwrap()
            .is_some()
    );
}

#[test]
fn test_malformed_tracking_is_rebuilt_on_transition() {
    let svc = create_test_service();
    let order = place_order(&svc);
    svc.context()
        .set(&keys::order_tracking(&order.id), b"not json")
        .unwrap();

    svc.update_order_status(&restaurant(), &order.id, OrderStatus::Accepted, None)
        .unwrap();

    let tracking: OrderTracking = svc.tracking(&order.id).unwrap();
    let statuses: Vec<OrderStatus> = tracking.status_history.iter().map(|u| u.status).collect();
    assert_eq!(statuses, vec![OrderStatus::Pending, OrderStatus::Accepted]);
    assert!(tracking.is_consistent());
}

#[test]
fn test_estimate_delivery_time() {
    let svc = create_test_service();
    let order = place_order(&svc);

    let before = shared::util::now_millis();
    let tracking = svc.estimate_delivery_time(&order.id, 15, 20).unwrap();
    let eta = tracking.estimated_arrival_time.unwrap();
    assert!(eta >= before + 35 * 60_000);
    assert_eq!(svc.tracking(&order.id).unwrap().estimated_arrival_time, Some(eta));

    let err = svc.estimate_delivery_time(&order.id, -1, 20).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailure);

    svc.cancel_order(&customer(), &order.id).unwrap();
    let err = svc.estimate_delivery_time(&order.id, 15, 20).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
}

#[test]
fn test_set_payment_status() {
    let svc = create_test_service();
    let order = place_order(&svc);

    let updated = svc
        .set_payment_status(&order.id, PaymentStatus::Completed)
        .unwrap();
    assert_eq!(updated.payment_status, PaymentStatus::Completed);
    assert_eq!(updated.status, OrderStatus::Pending);

    let err = svc
        .set_payment_status("missing", PaymentStatus::Completed)
        .unwrap_err();
    assert!(err.is_not_found());
}

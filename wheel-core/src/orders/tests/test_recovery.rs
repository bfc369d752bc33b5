use super::*;
use crate::repository::{load_record, save_record};
use crate::store::failing::FailingStore;
use std::sync::atomic::{AtomicBool, Ordering};

fn failing_service() -> (Arc<FailingStore>, OrderService) {
    let store = Arc::new(FailingStore::default());
    let shared: Arc<dyn KvStore> = store.clone();
    let svc = service_on(StoreContext::new("test", shared, ChangeBus::with_capacity(64)));
    (store, svc)
}

fn stored_tracking(svc: &OrderService, order_id: &str) -> OrderTracking {
    load_record(svc.context(), &keys::order_tracking(order_id))
        .unwrap()
        .unwrap()
}

// ========================================================================
// 写入失败: 订单与 tracking 都保持原状
// ========================================================================

#[test]
fn test_failed_tracking_write_leaves_order_unchanged() {
    let (store, svc) = failing_service();
    let order = place_order(&svc);

    store.fail_writes(keys::ORDER_TRACKING_PREFIX);
    let err = svc
        .update_order_status(&restaurant(), &order.id, OrderStatus::Accepted, None)
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::StorageUnavailable);
    store.heal();

    assert_eq!(svc.get_order(&order.id).unwrap(), order);
    let tracking = stored_tracking(&svc, &order.id);
    assert_eq!(tracking.current_status, OrderStatus::Pending);
    assert_eq!(tracking.status_history.len(), 1);

    // 恢复后可以重试
    let order = svc
        .update_order_status(&restaurant(), &order.id, OrderStatus::Accepted, None)
        .unwrap();
    assert_eq!(order.status, OrderStatus::Accepted);
    assert_eq!(stored_tracking(&svc, &order.id).status_history.len(), 2);
}

#[test]
fn test_failed_orders_write_restores_tracking() {
    let (store, svc) = failing_service();
    let order = place_order(&svc);
    let before = stored_tracking(&svc, &order.id);

    store.fail_writes(keys::ORDERS);
    let err = svc
        .update_order_status(&restaurant(), &order.id, OrderStatus::Accepted, None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
    store.heal();

    assert_eq!(svc.get_order(&order.id).unwrap().status, OrderStatus::Pending);
    assert_eq!(stored_tracking(&svc, &order.id), before);
}

#[test]
fn test_failed_create_persists_nothing() {
    let (store, svc) = failing_service();

    store.fail_writes(keys::ORDERS);
    assert!(svc.create_order(&customer(), simple_order()).is_err());
    store.heal();

    assert!(svc.list_orders().unwrap().is_empty());
    assert!(
        svc.context()
            .keys_with_prefix(keys::ORDER_TRACKING_PREFIX)
            .unwrap()
            .is_empty()
    );

    store.fail_writes(keys::ORDER_TRACKING_PREFIX);
    assert!(svc.create_order(&customer(), simple_order()).is_err());
    store.heal();
    assert!(svc.list_orders().unwrap().is_empty());
}

// ========================================================================
// tracking 落后于订单时在读取时修复
// ========================================================================

#[test]
fn test_tracking_behind_order_is_repaired() {
    let svc = create_test_service();
    let order = place_order(&svc);
    let stale = stored_tracking(&svc, &order.id);
    let order = svc
        .update_order_status(&restaurant(), &order.id, OrderStatus::Accepted, None)
        .unwrap();

    save_record(svc.context(), &keys::order_tracking(&order.id), &stale).unwrap();
    let tracking = svc.tracking(&order.id).unwrap();
    let statuses: Vec<OrderStatus> = tracking.status_history.iter().map(|u| u.status).collect();
    assert_eq!(statuses, vec![OrderStatus::Pending, OrderStatus::Accepted]);
    assert!(tracking.is_consistent());
    assert_eq!(stored_tracking(&svc, &order.id), tracking);
}

#[test]
fn test_inconsistent_tracking_is_rebuilt() {
    let svc = create_test_service();
    let order = place_order(&svc);
    let order = advance_until(&svc, &order.id, OrderStatus::Preparing);

    let mut broken = stored_tracking(&svc, &order.id);
    broken.current_status = OrderStatus::Delivered;
    save_record(svc.context(), &keys::order_tracking(&order.id), &broken).unwrap();

    let tracking = svc.tracking(&order.id).unwrap();
    assert_eq!(tracking.current_status, OrderStatus::Preparing);
    assert_eq!(tracking.status_history.len(), 1);
    assert!(tracking.is_consistent());
}

// ========================================================================
// 并发: ETA 更新与状态推进交错, 历史不丢失
// ========================================================================

#[test]
fn test_eta_updates_never_drop_history() {
    let svc = create_test_service();
    let order = place_order(&svc);
    let done = Arc::new(AtomicBool::new(false));

    let estimator = {
        let svc = svc.clone();
        let done = done.clone();
        let order_id = order.id.clone();
        std::thread::spawn(move || {
            let mut runs = 0;
            while !done.load(Ordering::SeqCst) || runs < 50 {
                svc.estimate_delivery_time(&order_id, 10, 10).unwrap();
                runs += 1;
            }
        })
    };

    advance_until(&svc, &order.id, OrderStatus::OnTheWay);
    done.store(true, Ordering::SeqCst);
    estimator.join().unwrap();

    // 直接读存储, 不经过读取时修复
    let tracking = stored_tracking(&svc, &order.id);
    assert_eq!(tracking.status_history.len(), 7);
    assert_eq!(tracking.current_status, OrderStatus::OnTheWay);
    assert!(tracking.is_consistent());
    assert!(tracking.estimated_arrival_time.is_some());
}

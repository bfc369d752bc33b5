use super::*;
use crate::notifications::NotificationService;
use crate::store::{KvStore, MemoryStore};
use crate::sync::{ChangeBus, StoreContext, keys};
use shared::error::{ErrorCode, ErrorKind};
use shared::order::{LineItem, NewOrder, Order, OrderStatus, OrderTracking, PaymentStatus};
use shared::types::Actor;
use std::sync::Arc;

fn service_on(ctx: StoreContext) -> OrderService {
    let notifications = NotificationService::new(ctx.clone());
    OrderService::new(ctx, notifications)
}

fn create_test_service() -> OrderService {
    let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
    service_on(StoreContext::new("test", store, ChangeBus::with_capacity(64)))
}

/// Two contexts ("tabs") on one store and bus
fn create_service_pair() -> (OrderService, OrderService) {
    let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
    let customer_ctx = StoreContext::new("customer", store, ChangeBus::with_capacity(64));
    let restaurant_ctx = customer_ctx.sibling("restaurant");
    (service_on(customer_ctx), service_on(restaurant_ctx))
}

fn customer() -> Actor {
    Actor::customer("cust-1").named("Somchai")
}

fn restaurant() -> Actor {
    Actor::restaurant("rest-1")
}

fn rider() -> Actor {
    Actor::rider("rider-1")
}

fn simple_item(id: &str, name: &str, price: f64, quantity: u32) -> LineItem {
    LineItem {
        id: id.to_string(),
        name: name.to_string(),
        name_th: None,
        unit_price: price,
        quantity,
    }
}

fn simple_order() -> NewOrder {
    NewOrder {
        restaurant_id: "rest-1".to_string(),
        restaurant_name: Some("Baan Somtum".to_string()),
        items: vec![
            simple_item("pad-thai", "Pad Thai", 60.0, 2),
            simple_item("som-tam", "Som Tam", 45.0, 1),
        ],
        delivery_fee: 30.0,
        tip: 10.0,
        delivery_address: Some("123 Sukhumvit Rd".to_string()),
        ..Default::default()
    }
}

fn place_order(svc: &OrderService) -> Order {
    svc.create_order(&customer(), simple_order()).unwrap()
}

/// Walk the chain until `target`, assigning rider-1 on the way
fn advance_until(svc: &OrderService, order_id: &str, target: OrderStatus) -> Order {
    let mut order = svc.get_order(order_id).unwrap();
    while order.status != target {
        let rider = (order.status == OrderStatus::ReadyForPickup).then_some("rider-1");
        order = svc.advance_to_next_status(&restaurant(), order_id, rider).unwrap();
    }
    order
}

mod test_flows;
mod test_recovery;

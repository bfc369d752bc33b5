//! OrderService - 订单记录与生命周期
//!
//! # 写入流程
//!
//! ```text
//! update_order_status(actor, order_id, status, rider)
//!     ├─ 1. exclusive() 串行化本上下文内的读-改-写
//!     ├─ 2. 重新读取完整订单集合
//!     ├─ 3. 状态机 + 骑手规则校验 (失败则不写任何记录)
//!     ├─ 4. 追加并写回 tracking 历史
//!     ├─ 5. 写回完整订单集合 (失败则恢复第 4 步之前的 tracking)
//!     ├─ 6. 释放锁
//!     └─ 7. 给顾客发订单状态通知
//! ```
//!
//! Every write replaces the whole collection; concurrent writers from other
//! contexts resolve as last-writer-wins. A tracking record that fell behind
//! its order is repaired on the next read.

use super::error::OrderError;
use super::machine;
use super::money::{calculate_subtotal, round_money, validate_new_order};
use crate::notifications::NotificationService;
use crate::repository::{Collection, load_record, restore, save_record, snapshot};
use crate::sync::{CollectionView, StoreContext, keys};
use crate::utils::time::minutes_to_millis;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, validate_optional_text, validate_required_text,
};
use shared::error::{AppError, AppResult};
use shared::order::{NewOrder, Order, OrderStatus, OrderTracking, PaymentStatus};
use shared::types::Actor;
use shared::util::{new_id, now_millis};

pub(crate) const ORDERS: Collection<Order> = Collection::new(keys::ORDERS);

/// Orders of one execution context
#[derive(Debug, Clone)]
pub struct OrderService {
    ctx: StoreContext,
    notifications: NotificationService,
}

impl OrderService {
    pub fn new(ctx: StoreContext, notifications: NotificationService) -> Self {
        Self { ctx, notifications }
    }

    pub fn context(&self) -> &StoreContext {
        &self.ctx
    }

    /// Live view of the orders collection for this context
    pub fn watch(&self) -> AppResult<CollectionView<Order>> {
        CollectionView::attach(&self.ctx, ORDERS.key())
    }

    // ========== Create ==========

    pub fn create_order(&self, actor: &Actor, input: NewOrder) -> AppResult<Order> {
        validate_required_text(&actor.id, "customer_id", MAX_NAME_LEN)?;
        validate_required_text(&input.restaurant_id, "restaurant_id", MAX_NAME_LEN)?;
        validate_optional_text(&input.restaurant_name, "restaurant_name", MAX_NAME_LEN)?;
        validate_optional_text(&input.customer_name, "customer_name", MAX_NAME_LEN)?;
        validate_optional_text(&input.delivery_address, "delivery_address", MAX_ADDRESS_LEN)?;
        validate_new_order(&input)?;

        let now = now_millis();
        let order = Order {
            id: new_id(),
            customer_id: actor.id.clone(),
            customer_name: input.customer_name.or_else(|| actor.name.clone()),
            restaurant_id: input.restaurant_id,
            restaurant_name: input.restaurant_name,
            rider_id: None,
            subtotal: calculate_subtotal(&input.items),
            items: input.items,
            delivery_fee: round_money(input.delivery_fee),
            tip: round_money(input.tip),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            delivery_address: input.delivery_address,
            delivery_coordinates: input.delivery_coordinates,
            restaurant_coordinates: input.restaurant_coordinates,
            created_at: now,
            updated_at: now,
        };

        {
            let _guard = self.ctx.exclusive();
            let tracking_key = keys::order_tracking(&order.id);
            let tracking = OrderTracking::new(&order.id, OrderStatus::Pending, now);
            save_record(&self.ctx, &tracking_key, &tracking)?;
            let inserted = ORDERS.update(&self.ctx, |orders| {
                orders.insert(0, order.clone());
                Ok(())
            });
            if let Err(e) = inserted {
                restore(&self.ctx, &tracking_key, None);
                return Err(e);
            }
        }

        tracing::info!(
            order_id = %order.id,
            customer_id = %order.customer_id,
            restaurant_id = %order.restaurant_id,
            subtotal = order.subtotal,
            "Order created"
        );
        Ok(order)
    }

    // ========== Lifecycle ==========

    pub fn update_order_status(
        &self,
        actor: &Actor,
        order_id: &str,
        new_status: OrderStatus,
        rider_id: Option<&str>,
    ) -> AppResult<Order> {
        let (order, from) = {
            let _guard = self.ctx.exclusive();
            let mut orders = ORDERS.load(&self.ctx)?;
            let order = orders
                .iter_mut()
                .find(|o| o.id == order_id)
                .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;

            let rider = machine::check_status_change(order, new_status, rider_id)?;
            let tracking_key = keys::order_tracking(order_id);
            let prior_tracking = snapshot(&self.ctx, &tracking_key)?;
            let (mut tracking, _) = self.read_tracking(order)?;

            let now = now_millis();
            let from = order.status;
            order.status = new_status;
            order.rider_id = rider;
            order.updated_at = now.max(order.updated_at);
            let updated = order.clone();

            tracking.record(new_status, now);
            save_record(&self.ctx, &tracking_key, &tracking)?;
            if let Err(e) = ORDERS.save(&self.ctx, &orders) {
                restore(&self.ctx, &tracking_key, prior_tracking.as_deref());
                return Err(e);
            }
            (updated, from)
        };

        tracing::info!(
            order_id = %order.id,
            from = %from,
            to = %order.status,
            actor = %actor.id,
            role = %actor.role,
            rider_id = ?order.rider_id,
            "Order status changed"
        );

        let restaurant = order
            .restaurant_name
            .as_deref()
            .unwrap_or(&order.restaurant_id);
        if let Err(e) = self.notifications.notify_order_status(
            &order.customer_id,
            &order.id,
            order.status,
            restaurant,
        ) {
            tracing::warn!(order_id = %order.id, error = %e, "Order status notification failed");
        }

        Ok(order)
    }

    /// Move to the single chain successor
    pub fn advance_to_next_status(
        &self,
        actor: &Actor,
        order_id: &str,
        rider_id: Option<&str>,
    ) -> AppResult<Order> {
        let order = self.get_order(order_id)?;
        let next = order
            .status
            .next()
            .ok_or(OrderError::OrderClosed(order.status))?;
        self.update_order_status(actor, order_id, next, rider_id)
    }

    pub fn cancel_order(&self, actor: &Actor, order_id: &str) -> AppResult<Order> {
        self.update_order_status(actor, order_id, OrderStatus::Cancelled, None)
    }

    /// Record the payment outcome on the order (not a lifecycle transition)
    pub fn set_payment_status(&self, order_id: &str, status: PaymentStatus) -> AppResult<Order> {
        let _guard = self.ctx.exclusive();
        ORDERS.update(&self.ctx, |orders| {
            let order = orders
                .iter_mut()
                .find(|o| o.id == order_id)
                .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;
            order.payment_status = status;
            order.updated_at = now_millis().max(order.updated_at);
            Ok(order.clone())
        })
    }

    // ========== Reads ==========

    /// All orders, newest created first
    pub fn list_orders(&self) -> AppResult<Vec<Order>> {
        let mut orders = ORDERS.load(&self.ctx)?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Orders matching `filter`, newest created first
    ///
    /// ```ignore
    /// let queue = orders.list_orders_where(OrderQuery::available_for_riders())?;
    /// let mine = orders.list_orders_where(|o| o.customer_id == "cust-1")?;
    /// ```
    pub fn list_orders_where(&self, filter: impl Fn(&Order) -> bool) -> AppResult<Vec<Order>> {
        let mut orders = self.list_orders()?;
        orders.retain(|o| filter(o));
        Ok(orders)
    }

    pub fn get_order(&self, order_id: &str) -> AppResult<Order> {
        ORDERS
            .load(&self.ctx)?
            .into_iter()
            .find(|o| o.id == order_id)
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()).into())
    }

    /// Tracking record of an order
    ///
    /// A record one step behind the order gets the order's status appended.
    /// A missing, unreadable or inconsistent record is rebuilt from the order
    /// itself (history `[current@updated_at]`). Either repair is written back.
    pub fn tracking(&self, order_id: &str) -> AppResult<OrderTracking> {
        let _guard = self.ctx.exclusive();
        let order = self.get_order(order_id)?;
        let (tracking, repaired) = self.read_tracking(&order)?;
        if repaired {
            save_record(&self.ctx, &keys::order_tracking(order_id), &tracking)?;
        }
        Ok(tracking)
    }

    /// Set the ETA to now + preparation + delivery minutes
    pub fn estimate_delivery_time(
        &self,
        order_id: &str,
        preparation_minutes: i64,
        delivery_minutes: i64,
    ) -> AppResult<OrderTracking> {
        let prep = u32::try_from(preparation_minutes).map_err(|_| {
            AppError::validation(format!(
                "preparation_minutes must be a non-negative number, got {}",
                preparation_minutes
            ))
        })?;
        let delivery = u32::try_from(delivery_minutes).map_err(|_| {
            AppError::validation(format!(
                "delivery_minutes must be a non-negative number, got {}",
                delivery_minutes
            ))
        })?;

        let _guard = self.ctx.exclusive();
        let order = self.get_order(order_id)?;
        if order.is_terminal() {
            return Err(OrderError::OrderClosed(order.status).into());
        }

        let (mut tracking, _) = self.read_tracking(&order)?;
        let eta = now_millis() + minutes_to_millis(prep) + minutes_to_millis(delivery);
        tracking.estimated_arrival_time = Some(eta);
        save_record(&self.ctx, &keys::order_tracking(order_id), &tracking)?;
        tracing::debug!(order_id = %order_id, eta, "Estimated arrival updated");
        Ok(tracking)
    }

    /// Stored tracking reconciled with `order`; caller holds the lock
    ///
    /// The flag is true when the returned record differs from the stored one.
    fn read_tracking(&self, order: &Order) -> AppResult<(OrderTracking, bool)> {
        let stored = load_record::<OrderTracking>(&self.ctx, &keys::order_tracking(&order.id))?;
        Ok(reconcile_tracking(order, stored))
    }
}

fn reconcile_tracking(order: &Order, stored: Option<OrderTracking>) -> (OrderTracking, bool) {
    let rebuilt = || OrderTracking::new(&order.id, order.status, order.updated_at);
    let Some(mut tracking) = stored else {
        tracing::warn!(order_id = %order.id, "Tracking missing, rebuilt from order");
        return (rebuilt(), true);
    };
    if tracking.order_id != order.id || !tracking.is_consistent() {
        tracing::warn!(order_id = %order.id, "Tracking inconsistent, rebuilt from order");
        return (rebuilt(), true);
    }
    if tracking.current_status == order.status {
        return (tracking, false);
    }
    if tracking.current_status.can_transition_to(order.status) {
        tracing::warn!(
            order_id = %order.id,
            tracked = %tracking.current_status,
            status = %order.status,
            "Tracking behind order, status appended"
        );
        tracking.record(order.status, order.updated_at);
        return (tracking, true);
    }
    if tracking.entered_at(order.status).is_some() {
        // 其他上下文的 tracking 已写入, 订单集合尚未写入
        return (tracking, false);
    }
    tracing::warn!(
        order_id = %order.id,
        tracked = %tracking.current_status,
        status = %order.status,
        "Tracking diverged from order, rebuilt"
    );
    (rebuilt(), true)
}

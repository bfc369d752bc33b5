//! PaymentService - PromptPay 支付
//!
//! ```text
//! create_payment   → pending
//! process_payment  → processing ──spawn──▶ verifier.verify()
//!                                              ├─ true  → completed (+completed_at)
//!                                              └─ false → failed
//!                   结果同时写入支付记录与订单, 并通知顾客
//! ```
//!
//! The verification task is fire-and-forget. [`PaymentTicket`] only lets a
//! caller wait for the outcome; it cannot abort the task.

use std::sync::Arc;

use tokio::sync::oneshot;

use super::verifier::PaymentVerifier;
use crate::notifications::NotificationService;
use crate::orders::OrderService;
use crate::repository::Collection;
use crate::sync::{StoreContext, keys};
use crate::utils::validation::validate_amount;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::order::{Payment, PaymentMethod, PaymentStatus};
use shared::util::{new_id, now_millis, payment_reference};

const PAYMENTS: Collection<Payment> = Collection::new(keys::PAYMENTS);

fn payment_not_found(order_id: &str) -> AppError {
    AppError::new(ErrorCode::PaymentNotFound).with_detail("order_id", order_id)
}

/// Handle on a running verification
#[derive(Debug)]
pub struct PaymentTicket {
    payment_id: String,
    order_id: String,
    rx: oneshot::Receiver<Option<PaymentStatus>>,
}

impl PaymentTicket {
    pub fn payment_id(&self) -> &str {
        &self.payment_id
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    /// Final status, or `None` when the result could not be recorded
    pub async fn outcome(self) -> Option<PaymentStatus> {
        self.rx.await.ok().flatten()
    }
}

/// Payments of one execution context
#[derive(Clone)]
pub struct PaymentService {
    ctx: StoreContext,
    orders: OrderService,
    notifications: NotificationService,
    verifier: Arc<dyn PaymentVerifier>,
}

impl std::fmt::Debug for PaymentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentService")
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

impl PaymentService {
    pub fn new(
        ctx: StoreContext,
        orders: OrderService,
        notifications: NotificationService,
        verifier: Arc<dyn PaymentVerifier>,
    ) -> Self {
        Self {
            ctx,
            orders,
            notifications,
            verifier,
        }
    }

    /// Start a payment for an order, replacing any earlier attempt
    pub fn create_payment(&self, order_id: &str, amount: f64) -> AppResult<Payment> {
        validate_amount(amount, "amount")?;
        if amount <= 0.0 {
            return Err(AppError::with_message(
                ErrorCode::InvalidAmount,
                format!("amount must be positive, got {}", amount),
            )
            .with_detail("field", "amount"));
        }
        self.orders.get_order(order_id)?;

        let now = now_millis();
        let payment = Payment {
            id: new_id(),
            order_id: order_id.to_string(),
            amount,
            status: PaymentStatus::Pending,
            method: PaymentMethod::Promptpay,
            reference: payment_reference(now),
            created_at: now,
            completed_at: None,
        };

        let _guard = self.ctx.exclusive();
        PAYMENTS.update(&self.ctx, |payments| {
            if payments
                .iter()
                .any(|p| p.order_id == order_id && p.status == PaymentStatus::Processing)
            {
                return Err(AppError::new(ErrorCode::PaymentInProgress)
                    .with_detail("order_id", order_id));
            }
            payments.retain(|p| p.order_id != order_id);
            payments.push(payment.clone());
            Ok(())
        })?;
        tracing::info!(order_id = %order_id, reference = %payment.reference, amount, "Payment created");
        Ok(payment)
    }

    pub fn payment_for_order(&self, order_id: &str) -> AppResult<Option<Payment>> {
        Ok(PAYMENTS
            .load(&self.ctx)?
            .into_iter()
            .find(|p| p.order_id == order_id))
    }

    /// Mark the payment processing and verify it in the background
    ///
    /// Must be called inside a tokio runtime.
    pub fn process_payment(&self, order_id: &str) -> AppResult<PaymentTicket> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| AppError::internal(format!("No async runtime: {}", e)))?;

        let (payment, prior) = {
            let _guard = self.ctx.exclusive();
            PAYMENTS.update(&self.ctx, |payments| {
                let payment = payments
                    .iter_mut()
                    .find(|p| p.order_id == order_id)
                    .ok_or_else(|| payment_not_found(order_id))?;
                match payment.status {
                    PaymentStatus::Processing => {
                        return Err(AppError::new(ErrorCode::PaymentInProgress)
                            .with_detail("order_id", order_id));
                    }
                    PaymentStatus::Completed => {
                        return Err(AppError::validation("Payment already completed")
                            .with_detail("order_id", order_id));
                    }
                    PaymentStatus::Pending | PaymentStatus::Failed => {}
                }
                let prior = payment.status;
                payment.status = PaymentStatus::Processing;
                Ok((payment.clone(), prior))
            })?
        };
        if let Err(e) = self
            .orders
            .set_payment_status(order_id, PaymentStatus::Processing)
        {
            self.abandon_attempt(&payment, prior);
            return Err(e);
        }
        tracing::info!(order_id = %order_id, reference = %payment.reference, "Payment verification started");

        let (tx, rx) = oneshot::channel();
        let svc = self.clone();
        let task_payment = payment.clone();
        handle.spawn(async move {
            let approved = svc
                .verifier
                .verify(&task_payment.reference, task_payment.amount)
                .await;
            let status = if approved {
                PaymentStatus::Completed
            } else {
                PaymentStatus::Failed
            };
            let outcome = match svc.finish(&task_payment, status) {
                Ok(recorded) => recorded.then_some(status),
                Err(e) => {
                    tracing::error!(order_id = %task_payment.order_id, error = %e, "Failed to record payment result");
                    None
                }
            };
            let _ = tx.send(outcome);
        });

        Ok(PaymentTicket {
            payment_id: payment.id,
            order_id: payment.order_id,
            rx,
        })
    }

    /// Put a payment that never reached verification back to `prior`
    fn abandon_attempt(&self, attempt: &Payment, prior: PaymentStatus) {
        let _guard = self.ctx.exclusive();
        let reverted = PAYMENTS.update(&self.ctx, |payments| {
            if let Some(payment) = payments
                .iter_mut()
                .find(|p| p.id == attempt.id && p.status == PaymentStatus::Processing)
            {
                payment.status = prior;
            }
            Ok(())
        });
        match reverted {
            Ok(()) => tracing::warn!(order_id = %attempt.order_id, status = %prior, "Payment attempt abandoned"),
            Err(e) => tracing::error!(order_id = %attempt.order_id, error = %e, "Failed to revert payment attempt"),
        }
    }

    /// Record the verification result; false when the attempt was replaced meanwhile
    fn finish(&self, attempt: &Payment, status: PaymentStatus) -> AppResult<bool> {
        let recorded = {
            let _guard = self.ctx.exclusive();
            PAYMENTS.update(&self.ctx, |payments| {
                let Some(payment) = payments.iter_mut().find(|p| p.id == attempt.id) else {
                    return Ok(false);
                };
                payment.status = status;
                payment.completed_at = (status == PaymentStatus::Completed).then(now_millis);
                Ok(true)
            })?
        };
        if !recorded {
            tracing::warn!(order_id = %attempt.order_id, payment_id = %attempt.id, "Payment attempt replaced before verification finished");
            return Ok(false);
        }

        let order = self.orders.set_payment_status(&attempt.order_id, status)?;
        tracing::info!(order_id = %order.id, status = %status, "Payment verification finished");
        if let Err(e) =
            self.notifications
                .notify_payment(&order.customer_id, &order.id, status, attempt.amount)
        {
            tracing::warn!(order_id = %order.id, error = %e, "Payment notification failed");
        }
        Ok(true)
    }
}

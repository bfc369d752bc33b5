//! Notification templates
//!
//! Pure builders: nothing here touches the store.

use shared::messaging::UserType;
use shared::notification::{NewNotification, NotificationCategory, RelatedEntity, SenderType};
use shared::order::{OrderStatus, PaymentStatus, SimpleStatus};

/// Order status change, addressed to the customer
pub fn order_status(
    recipient_id: &str,
    order_id: &str,
    status: OrderStatus,
    restaurant_name: &str,
) -> NewNotification {
    let r = restaurant_name;
    let (title, content) = match status.simple() {
        SimpleStatus::Accepted => (
            "Order Accepted",
            format!("{} has accepted your order and is preparing it.", r),
        ),
        SimpleStatus::Preparing => (
            "Order Being Prepared",
            format!("{} is now preparing your order.", r),
        ),
        SimpleStatus::Ready => (
            "Order Ready for Pickup",
            format!("Your order from {} is ready for pickup by a rider.", r),
        ),
        SimpleStatus::PickedUp => (
            "Order Picked Up",
            format!("Your order from {} has been picked up and is on its way.", r),
        ),
        SimpleStatus::Delivered => (
            "Order Delivered",
            format!("Your order from {} has been delivered. Enjoy your meal!", r),
        ),
        SimpleStatus::Cancelled => (
            "Order Cancelled",
            format!("Your order from {} has been cancelled.", r),
        ),
        SimpleStatus::Pending => (
            "Order Update",
            format!("There's an update to your order from {}.", r),
        ),
    };

    NewNotification::new(recipient_id, NotificationCategory::OrderUpdate, title, content)
        .from_sender(None, SenderType::System)
        .related(order_id, RelatedEntity::Order)
        .action(Some(format!("/customer/orders/{}", order_id)))
}

/// Payment result; `None` for non-final statuses
pub fn payment(
    recipient_id: &str,
    order_id: &str,
    status: PaymentStatus,
    amount: f64,
) -> Option<NewNotification> {
    let (title, content, action) = match status {
        PaymentStatus::Completed => (
            "Payment Successful",
            format!(
                "Your payment of ฿{:.2} has been processed successfully.",
                amount
            ),
            format!("/customer/orders/{}", order_id),
        ),
        PaymentStatus::Failed => (
            "Payment Failed",
            format!(
                "Your payment of ฿{:.2} could not be processed. Please try again.",
                amount
            ),
            format!("/payment/{}", order_id),
        ),
        PaymentStatus::Pending | PaymentStatus::Processing => return None,
    };

    Some(
        NewNotification::new(recipient_id, NotificationCategory::OrderUpdate, title, content)
            .from_sender(None, SenderType::System)
            .related(order_id, RelatedEntity::Order)
            .action(Some(action)),
    )
}

/// New chat message
pub fn message(
    recipient_id: &str,
    sender_id: &str,
    sender_type: UserType,
    sender_name: &str,
    preview: &str,
    thread_id: &str,
) -> NewNotification {
    NewNotification::new(
        recipient_id,
        NotificationCategory::Message,
        format!("New Message from {}", sender_name),
        preview,
    )
    .from_sender(Some(sender_id.to_string()), SenderType::from(sender_type))
    .related(thread_id, RelatedEntity::MessageThread)
    .action(Some(format!("/messages/{}", thread_id)))
}

pub fn promotion(
    recipient_id: &str,
    title: &str,
    content: &str,
    promotion_id: &str,
) -> NewNotification {
    NewNotification::new(recipient_id, NotificationCategory::Promotion, title, content)
        .from_sender(None, SenderType::System)
        .related(promotion_id, RelatedEntity::Promotion)
        .action(Some(format!("/promotions/{}", promotion_id)))
}

pub fn system(
    recipient_id: &str,
    title: &str,
    content: &str,
    action_url: Option<String>,
) -> NewNotification {
    NewNotification::new(recipient_id, NotificationCategory::System, title, content)
        .from_sender(None, SenderType::System)
        .action(action_url)
}

use super::generators;
use super::preferences::PreferenceService;
use crate::repository::Collection;
use crate::sync::{StoreContext, keys};
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTIFICATION_LEN, validate_required_text};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::messaging::UserType;
use shared::notification::{Channel, NewNotification, Notification, NotificationCategory};
use shared::order::{OrderStatus, PaymentStatus};
use shared::util::{new_id, now_millis};

const NOTIFICATIONS: Collection<Notification> = Collection::new(keys::NOTIFICATIONS);

/// Notification store of one execution context
///
/// Records are immutable except `is_read`. Preferences are applied when
/// reading ([`NotificationService::surfaced`]), never when storing, with one
/// exception: chat message notifications for a recipient who muted messages
/// in-app are not created at all.
#[derive(Debug, Clone)]
pub struct NotificationService {
    ctx: StoreContext,
    preferences: PreferenceService,
}

impl NotificationService {
    pub fn new(ctx: StoreContext) -> Self {
        let preferences = PreferenceService::new(ctx.clone());
        Self { ctx, preferences }
    }

    pub fn preferences(&self) -> &PreferenceService {
        &self.preferences
    }

    pub fn create(&self, input: NewNotification) -> AppResult<Notification> {
        validate_required_text(&input.recipient_id, "recipient_id", MAX_NAME_LEN)?;
        validate_required_text(&input.title, "title", MAX_NAME_LEN)?;
        validate_required_text(&input.content, "content", MAX_NOTIFICATION_LEN)?;

        let notification = Notification {
            id: new_id(),
            recipient_id: input.recipient_id,
            sender_id: input.sender_id,
            sender_type: input.sender_type,
            category: input.category,
            title: input.title,
            content: input.content,
            timestamp: now_millis(),
            is_read: false,
            action_url: input.action_url,
            related_entity_id: input.related_entity_id,
            related_entity_type: input.related_entity_type,
        };

        let _guard = self.ctx.exclusive();
        NOTIFICATIONS.update(&self.ctx, |all| {
            all.insert(0, notification.clone());
            Ok(())
        })?;
        tracing::debug!(
            notification_id = %notification.id,
            recipient_id = %notification.recipient_id,
            category = %notification.category,
            "Notification created"
        );
        Ok(notification)
    }

    // ========== Generators ==========

    pub fn notify_order_status(
        &self,
        recipient_id: &str,
        order_id: &str,
        status: OrderStatus,
        restaurant_name: &str,
    ) -> AppResult<Notification> {
        self.create(generators::order_status(
            recipient_id,
            order_id,
            status,
            restaurant_name,
        ))
    }

    /// Payment result; nothing is stored for non-final statuses
    pub fn notify_payment(
        &self,
        recipient_id: &str,
        order_id: &str,
        status: PaymentStatus,
        amount: f64,
    ) -> AppResult<Option<Notification>> {
        generators::payment(recipient_id, order_id, status, amount)
            .map(|n| self.create(n))
            .transpose()
    }

    /// Chat message, skipped when the recipient muted messages in-app
    pub fn notify_message(
        &self,
        recipient_id: &str,
        sender_id: &str,
        sender_type: UserType,
        sender_name: &str,
        preview: &str,
        thread_id: &str,
    ) -> AppResult<Option<Notification>> {
        if !self
            .preferences
            .should_show(recipient_id, NotificationCategory::Message, Channel::InApp)?
        {
            tracing::debug!(recipient_id = %recipient_id, thread_id = %thread_id, "Message notification suppressed");
            return Ok(None);
        }
        self.create(generators::message(
            recipient_id,
            sender_id,
            sender_type,
            sender_name,
            preview,
            thread_id,
        ))
        .map(Some)
    }

    pub fn notify_promotion(
        &self,
        recipient_id: &str,
        title: &str,
        content: &str,
        promotion_id: &str,
    ) -> AppResult<Notification> {
        self.create(generators::promotion(recipient_id, title, content, promotion_id))
    }

    pub fn notify_system(
        &self,
        recipient_id: &str,
        title: &str,
        content: &str,
        action_url: Option<String>,
    ) -> AppResult<Notification> {
        self.create(generators::system(recipient_id, title, content, action_url))
    }

    // ========== Reads ==========

    /// Everything stored for a recipient, newest first
    pub fn for_recipient(&self, recipient_id: &str) -> AppResult<Vec<Notification>> {
        let mut list: Vec<Notification> = NOTIFICATIONS
            .load(&self.ctx)?
            .into_iter()
            .filter(|n| n.recipient_id == recipient_id)
            .collect();
        list.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(list)
    }

    /// What the recipient should see on `channel` under current preferences
    pub fn surfaced(&self, recipient_id: &str, channel: Channel) -> AppResult<Vec<Notification>> {
        let all = self.for_recipient(recipient_id)?;
        let Some(prefs) = self.preferences.get(recipient_id)? else {
            return Ok(all);
        };
        Ok(all
            .into_iter()
            .filter(|n| prefs.permits(n.category, channel))
            .collect())
    }

    pub fn unread_count(&self, recipient_id: &str, channel: Channel) -> AppResult<usize> {
        Ok(self
            .surfaced(recipient_id, channel)?
            .iter()
            .filter(|n| !n.is_read)
            .count())
    }

    // ========== Mutations ==========

    pub fn mark_read(&self, notification_id: &str) -> AppResult<Notification> {
        let _guard = self.ctx.exclusive();
        NOTIFICATIONS.update(&self.ctx, |all| {
            let n = all
                .iter_mut()
                .find(|n| n.id == notification_id)
                .ok_or_else(|| {
                    AppError::new(ErrorCode::NotificationNotFound)
                        .with_detail("notification_id", notification_id)
                })?;
            n.is_read = true;
            Ok(n.clone())
        })
    }

    /// Returns the number of notifications flipped to read
    pub fn mark_all_read(&self, recipient_id: &str) -> AppResult<usize> {
        let _guard = self.ctx.exclusive();
        let mut all = NOTIFICATIONS.load(&self.ctx)?;
        let mut flipped = 0;
        for n in all
            .iter_mut()
            .filter(|n| n.recipient_id == recipient_id && !n.is_read)
        {
            n.is_read = true;
            flipped += 1;
        }
        if flipped > 0 {
            NOTIFICATIONS.save(&self.ctx, &all)?;
        }
        Ok(flipped)
    }

    pub fn delete(&self, notification_id: &str) -> AppResult<()> {
        let _guard = self.ctx.exclusive();
        let mut all = NOTIFICATIONS.load(&self.ctx)?;
        let before = all.len();
        all.retain(|n| n.id != notification_id);
        if all.len() == before {
            return Err(AppError::new(ErrorCode::NotificationNotFound)
                .with_detail("notification_id", notification_id));
        }
        NOTIFICATIONS.save(&self.ctx, &all)?;
        Ok(())
    }

    /// Returns the number of notifications removed
    pub fn clear_all(&self, recipient_id: &str) -> AppResult<usize> {
        let _guard = self.ctx.exclusive();
        let mut all = NOTIFICATIONS.load(&self.ctx)?;
        let before = all.len();
        all.retain(|n| n.recipient_id != recipient_id);
        let removed = before - all.len();
        if removed > 0 {
            NOTIFICATIONS.save(&self.ctx, &all)?;
            tracing::info!(recipient_id = %recipient_id, removed, "Notifications cleared");
        }
        Ok(removed)
    }
}

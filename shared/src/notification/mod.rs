//! Notification types and per-user preferences

use crate::messaging::UserType;
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Notification category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    OrderUpdate,
    Message,
    Promotion,
    System,
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationCategory::OrderUpdate => "order_update",
            NotificationCategory::Message => "message",
            NotificationCategory::Promotion => "promotion",
            NotificationCategory::System => "system",
        };
        f.write_str(s)
    }
}

/// Delivery channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    InApp,
    Browser,
    Email,
}

/// Who produced a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderType {
    System,
    Customer,
    Restaurant,
    Rider,
}

impl From<UserType> for SenderType {
    fn from(value: UserType) -> Self {
        match value {
            UserType::Customer => SenderType::Customer,
            UserType::Restaurant => SenderType::Restaurant,
            UserType::Rider => SenderType::Rider,
            UserType::Support | UserType::System => SenderType::System,
        }
    }
}

/// Entity a notification points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelatedEntity {
    Order,
    MessageThread,
    Promotion,
}

/// Stored notification (immutable except `is_read`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub recipient_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_type: Option<SenderType>,
    #[serde(rename = "type")]
    pub category: NotificationCategory,
    pub title: String,
    pub content: String,
    pub timestamp: Timestamp,
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_entity_type: Option<RelatedEntity>,
}

/// Input for a new notification
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient_id: String,
    pub category: NotificationCategory,
    pub title: String,
    pub content: String,
    pub sender_id: Option<String>,
    pub sender_type: Option<SenderType>,
    pub action_url: Option<String>,
    pub related_entity_id: Option<String>,
    pub related_entity_type: Option<RelatedEntity>,
}

impl NewNotification {
    pub fn new(
        recipient_id: impl Into<String>,
        category: NotificationCategory,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            recipient_id: recipient_id.into(),
            category,
            title: title.into(),
            content: content.into(),
            sender_id: None,
            sender_type: None,
            action_url: None,
            related_entity_id: None,
            related_entity_type: None,
        }
    }

    pub fn from_sender(mut self, sender_id: Option<String>, sender_type: SenderType) -> Self {
        self.sender_id = sender_id;
        self.sender_type = Some(sender_type);
        self
    }

    pub fn related(mut self, entity_id: impl Into<String>, entity: RelatedEntity) -> Self {
        self.related_entity_id = Some(entity_id.into());
        self.related_entity_type = Some(entity);
        self
    }

    pub fn action(mut self, url: Option<String>) -> Self {
        self.action_url = url;
        self
    }
}

/// Per-user notification switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub user_id: String,
    pub user_type: UserType,

    // 渠道
    pub in_app_enabled: bool,
    pub browser_enabled: bool,
    pub email_enabled: bool,

    // 类别
    pub order_updates: bool,
    pub messages: bool,
    pub promotions: bool,
    pub system_updates: bool,
}

impl NotificationPreferences {
    /// Defaults: everything on, promotions only for customers
    pub fn defaults_for(user_id: impl Into<String>, user_type: UserType) -> Self {
        Self {
            user_id: user_id.into(),
            user_type,
            in_app_enabled: true,
            browser_enabled: true,
            email_enabled: true,
            order_updates: true,
            messages: true,
            promotions: user_type == UserType::Customer,
            system_updates: true,
        }
    }

    pub fn channel_enabled(&self, channel: Channel) -> bool {
        match channel {
            Channel::InApp => self.in_app_enabled,
            Channel::Browser => self.browser_enabled,
            Channel::Email => self.email_enabled,
        }
    }

    pub fn category_enabled(&self, category: NotificationCategory) -> bool {
        match category {
            NotificationCategory::OrderUpdate => self.order_updates,
            NotificationCategory::Message => self.messages,
            NotificationCategory::Promotion => self.promotions,
            NotificationCategory::System => self.system_updates,
        }
    }

    /// Eligibility: channel flag and category flag
    pub fn permits(&self, category: NotificationCategory, channel: Channel) -> bool {
        self.channel_enabled(channel) && self.category_enabled(category)
    }

    /// Apply a partial update, returning whether anything was set
    pub fn apply(&mut self, update: &PreferencesUpdate) -> bool {
        let mut touched = false;
        let fields = [
            (update.in_app_enabled, &mut self.in_app_enabled),
            (update.browser_enabled, &mut self.browser_enabled),
            (update.email_enabled, &mut self.email_enabled),
            (update.order_updates, &mut self.order_updates),
            (update.messages, &mut self.messages),
            (update.promotions, &mut self.promotions),
            (update.system_updates, &mut self.system_updates),
        ];
        for (value, slot) in fields {
            if let Some(v) = value {
                *slot = v;
                touched = true;
            }
        }
        touched
    }
}

/// Partial preference update (user id and type are immutable)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_app_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_updates: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_updates: Option<bool>,
}

impl PreferencesUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_promotions_only_for_customers() {
        assert!(NotificationPreferences::defaults_for("c-1", UserType::Customer).promotions);
        assert!(!NotificationPreferences::defaults_for("r-1", UserType::Rider).promotions);
        assert!(!NotificationPreferences::defaults_for("s-1", UserType::Restaurant).promotions);
    }

    #[test]
    fn test_permits_needs_channel_and_category() {
        let mut prefs = NotificationPreferences::defaults_for("c-1", UserType::Customer);
        assert!(prefs.permits(NotificationCategory::Message, Channel::InApp));
        prefs.in_app_enabled = false;
        assert!(!prefs.permits(NotificationCategory::Message, Channel::InApp));
        assert!(prefs.permits(NotificationCategory::Message, Channel::Email));
        prefs.messages = false;
        assert!(!prefs.permits(NotificationCategory::Message, Channel::Email));
        assert!(prefs.permits(NotificationCategory::OrderUpdate, Channel::Email));
    }

    #[test]
    fn test_apply_update() {
        let mut prefs = NotificationPreferences::defaults_for("r-1", UserType::Rider);
        assert!(!prefs.apply(&PreferencesUpdate::default()));
        let update = PreferencesUpdate {
            email_enabled: Some(false),
            ..Default::default()
        };
        assert!(prefs.apply(&update));
        assert!(!prefs.email_enabled);
        assert!(prefs.browser_enabled);
    }

    #[test]
    fn test_category_serializes_as_type() {
        let n = Notification {
            id: "n-1".into(),
            recipient_id: "c-1".into(),
            sender_id: None,
            sender_type: Some(SenderType::System),
            category: NotificationCategory::OrderUpdate,
            title: "Order Accepted".into(),
            content: String::new(),
            timestamp: 0,
            is_read: false,
            action_url: None,
            related_entity_id: None,
            related_entity_type: None,
        };
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "order_update");
    }
}

//! Messaging types: threads, messages, participants

use crate::types::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Preview shown on a thread that has no messages yet
pub const EMPTY_THREAD_PREVIEW: &str = "No messages yet";

/// Kind of party in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Customer,
    Restaurant,
    Rider,
    Support,
    System,
}

impl UserType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            UserType::Customer => "customer",
            UserType::Restaurant => "restaurant",
            UserType::Rider => "rider",
            UserType::Support => "support",
            UserType::System => "system",
        }
    }

    /// Whether notification preferences can be stored for this type
    pub const fn has_preferences(&self) -> bool {
        matches!(
            self,
            UserType::Customer | UserType::Restaurant | UserType::Rider
        )
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thread participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub name: String,
}

impl Participant {
    pub fn new(id: impl Into<String>, user_type: UserType, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_type,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Image,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub url: String,
    pub name: String,
}

/// Entity a thread is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadEntity {
    Order,
}

/// Conversation between two or more parties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageThread {
    pub id: String,
    pub participants: Vec<Participant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub last_message_timestamp: Timestamp,
    pub last_message_preview: String,
    /// Empty until the first message is sent
    #[serde(default)]
    pub last_message_sender_id: String,
    pub unread_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_entity_type: Option<ThreadEntity>,
}

impl MessageThread {
    pub fn participant(&self, user_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == user_id)
    }

    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participant(user_id).is_some()
    }

    /// Recipient of a message from `sender_id`: the first other participant
    pub fn counterpart_of(&self, sender_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id != sender_id)
    }

    /// Unread count as seen by `viewer`
    ///
    /// A viewer never has unread messages they sent themselves.
    pub fn unread_for(&self, viewer: &str) -> u32 {
        if self.last_message_sender_id == viewer {
            0
        } else {
            self.unread_count
        }
    }
}

/// One chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub thread_id: String,
    pub sender_id: String,
    pub sender_type: UserType,
    pub sender_name: String,
    pub recipient_id: String,
    pub recipient_type: UserType,
    pub recipient_name: String,
    pub content: String,
    pub timestamp: Timestamp,
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// Options for a new thread
#[derive(Debug, Clone, Default)]
pub struct ThreadOptions {
    pub subject: Option<String>,
    pub related_order_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread() -> MessageThread {
        MessageThread {
            id: "t-1".into(),
            participants: vec![
                Participant::new("c-1", UserType::Customer, "Nattapong S."),
                Participant::new("r-1", UserType::Rider, "Sompong K."),
            ],
            subject: None,
            last_message_timestamp: 0,
            last_message_preview: EMPTY_THREAD_PREVIEW.into(),
            last_message_sender_id: "r-1".into(),
            unread_count: 3,
            related_entity_id: None,
            related_entity_type: None,
        }
    }

    #[test]
    fn test_counterpart() {
        let t = thread();
        assert_eq!(t.counterpart_of("c-1").map(|p| p.id.as_str()), Some("r-1"));
        assert_eq!(t.counterpart_of("r-1").map(|p| p.id.as_str()), Some("c-1"));
    }

    #[test]
    fn test_unread_for_viewer() {
        let t = thread();
        assert_eq!(t.unread_for("c-1"), 3);
        assert_eq!(t.unread_for("r-1"), 0);
    }

    #[test]
    fn test_participant_serializes_type_field() {
        let p = Participant::new("c-1", UserType::Customer, "Nattapong S.");
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["type"], "customer");
    }
}

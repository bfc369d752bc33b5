//! Messaging - 会话与消息
//!
//! Threads and messages live in two whole-collection keys. Sending a message
//! writes both, then (outside the write lock) asks the notification service
//! to tell the recipient.

mod service;

pub use service::MessagingService;

use crate::notifications::NotificationService;
use crate::repository::Collection;
use crate::sync::{CollectionView, StoreContext, keys};
use crate::utils::validation::{MAX_MESSAGE_LEN, MAX_NAME_LEN, validate_optional_text, validate_required_text};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::messaging::{
    Attachment, EMPTY_THREAD_PREVIEW, Message, MessageThread, Participant, ThreadEntity,
    ThreadOptions,
};
use shared::util::{new_id, now_millis, preview_text};
use std::collections::HashSet;

const THREADS: Collection<MessageThread> = Collection::new(keys::MESSAGE_THREADS);
const MESSAGES: Collection<Message> = Collection::new(keys::MESSAGES);

fn thread_not_found(thread_id: &str) -> AppError {
    AppError::new(ErrorCode::ThreadNotFound).with_detail("thread_id", thread_id)
}

/// Conversations of one execution context
#[derive(Debug, Clone)]
pub struct MessagingService {
    ctx: StoreContext,
    notifications: NotificationService,
}

impl MessagingService {
    pub fn new(ctx: StoreContext, notifications: NotificationService) -> Self {
        Self { ctx, notifications }
    }

    /// Live view of every thread
    pub fn watch_threads(&self) -> AppResult<CollectionView<MessageThread>> {
        CollectionView::attach(&self.ctx, THREADS.key())
    }

    /// Live view of every message
    pub fn watch_messages(&self) -> AppResult<CollectionView<Message>> {
        CollectionView::attach(&self.ctx, MESSAGES.key())
    }

    pub fn create_thread(
        &self,
        participants: Vec<Participant>,
        options: ThreadOptions,
    ) -> AppResult<MessageThread> {
        if participants.len() < 2 {
            return Err(AppError::new(ErrorCode::TooFewParticipants)
                .with_detail("participants", participants.len()));
        }
        let mut seen = HashSet::new();
        for p in &participants {
            validate_required_text(&p.id, "participant id", MAX_NAME_LEN)?;
            validate_required_text(&p.name, "participant name", MAX_NAME_LEN)?;
            if !seen.insert(p.id.as_str()) {
                return Err(AppError::validation(format!(
                    "Participant {} listed twice",
                    p.id
                ))
                .with_detail("participant_id", p.id.as_str()));
            }
        }
        validate_optional_text(&options.subject, "subject", MAX_NAME_LEN)?;

        let (related_entity_id, related_entity_type) = match options.related_order_id {
            Some(order_id) => (Some(order_id), Some(ThreadEntity::Order)),
            None => (None, None),
        };
        let thread = MessageThread {
            id: new_id(),
            participants,
            subject: options.subject,
            last_message_timestamp: now_millis(),
            last_message_preview: EMPTY_THREAD_PREVIEW.to_string(),
            last_message_sender_id: String::new(),
            unread_count: 0,
            related_entity_id,
            related_entity_type,
        };

        let _guard = self.ctx.exclusive();
        THREADS.update(&self.ctx, |threads| {
            threads.push(thread.clone());
            Ok(())
        })?;
        tracing::info!(thread_id = %thread.id, participants = thread.participants.len(), "Message thread created");
        Ok(thread)
    }

    /// Threads the user takes part in, most recent activity first
    pub fn threads_for(&self, user_id: &str) -> AppResult<Vec<MessageThread>> {
        let mut threads: Vec<MessageThread> = THREADS
            .load(&self.ctx)?
            .into_iter()
            .filter(|t| t.has_participant(user_id))
            .collect();
        threads.sort_by(|a, b| b.last_message_timestamp.cmp(&a.last_message_timestamp));
        Ok(threads)
    }

    pub fn get_thread(&self, thread_id: &str) -> AppResult<MessageThread> {
        THREADS
            .load(&self.ctx)?
            .into_iter()
            .find(|t| t.id == thread_id)
            .ok_or_else(|| thread_not_found(thread_id))
    }

    /// Append a message from `sender_id` to the thread
    ///
    /// The recipient is the first participant other than the sender.
    pub fn send_message(
        &self,
        thread_id: &str,
        sender_id: &str,
        content: &str,
        attachments: Vec<Attachment>,
    ) -> AppResult<Message> {
        validate_required_text(content, "content", MAX_MESSAGE_LEN)?;

        let message = {
            let _guard = self.ctx.exclusive();
            let mut threads = THREADS.load(&self.ctx)?;
            let thread = threads
                .iter_mut()
                .find(|t| t.id == thread_id)
                .ok_or_else(|| thread_not_found(thread_id))?;

            let sender = thread.participant(sender_id).cloned().ok_or_else(|| {
                AppError::new(ErrorCode::NotAParticipant)
                    .with_detail("thread_id", thread_id)
                    .with_detail("sender_id", sender_id)
            })?;
            let recipient = thread
                .counterpart_of(sender_id)
                .cloned()
                .ok_or_else(|| AppError::new(ErrorCode::TooFewParticipants))?;

            let now = now_millis().max(thread.last_message_timestamp);
            let message = Message {
                id: new_id(),
                thread_id: thread_id.to_string(),
                sender_id: sender.id,
                sender_type: sender.user_type,
                sender_name: sender.name,
                recipient_id: recipient.id,
                recipient_type: recipient.user_type,
                recipient_name: recipient.name,
                content: content.to_string(),
                timestamp: now,
                is_read: false,
                attachments,
            };

            MESSAGES.update(&self.ctx, |messages| {
                messages.push(message.clone());
                Ok(())
            })?;

            thread.last_message_timestamp = now;
            thread.last_message_preview = preview_text(content);
            thread.last_message_sender_id = message.sender_id.clone();
            thread.unread_count += 1;
            THREADS.save(&self.ctx, &threads)?;
            message
        };

        tracing::debug!(thread_id = %thread_id, message_id = %message.id, "Message sent");

        if let Err(e) = self.notifications.notify_message(
            &message.recipient_id,
            &message.sender_id,
            message.sender_type,
            &message.sender_name,
            &preview_text(content),
            thread_id,
        ) {
            tracing::warn!(thread_id = %thread_id, error = %e, "Message notification failed");
        }
        Ok(message)
    }

    /// Messages of a thread, oldest first
    pub fn messages(&self, thread_id: &str) -> AppResult<Vec<Message>> {
        let mut messages: Vec<Message> = MESSAGES
            .load(&self.ctx)?
            .into_iter()
            .filter(|m| m.thread_id == thread_id)
            .collect();
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }

    /// Mark messages addressed to `reader` as read
    ///
    /// The thread counter is zeroed only when the last message came from
    /// someone else.
    pub fn mark_thread_read(&self, thread_id: &str, reader_id: &str) -> AppResult<()> {
        let _guard = self.ctx.exclusive();
        let mut threads = THREADS.load(&self.ctx)?;
        let thread = threads
            .iter_mut()
            .find(|t| t.id == thread_id)
            .ok_or_else(|| thread_not_found(thread_id))?;

        let mut messages = MESSAGES.load(&self.ctx)?;
        let mut flipped = 0;
        for m in messages
            .iter_mut()
            .filter(|m| m.thread_id == thread_id && m.recipient_id == reader_id && !m.is_read)
        {
            m.is_read = true;
            flipped += 1;
        }
        if flipped > 0 {
            MESSAGES.save(&self.ctx, &messages)?;
        }

        if thread.last_message_sender_id != reader_id && thread.unread_count > 0 {
            thread.unread_count = 0;
            THREADS.save(&self.ctx, &threads)?;
        }
        Ok(())
    }

    /// Unread count of one thread as seen by `viewer`
    pub fn unread_count_for(&self, thread_id: &str, viewer_id: &str) -> AppResult<u32> {
        Ok(self.get_thread(thread_id)?.unread_for(viewer_id))
    }

    /// Unread messages across every thread of the user
    pub fn unread_total(&self, user_id: &str) -> AppResult<u32> {
        Ok(self
            .threads_for(user_id)?
            .iter()
            .map(|t| t.unread_for(user_id))
            .sum())
    }

    /// Remove a thread and every message in it
    pub fn delete_thread(&self, thread_id: &str) -> AppResult<()> {
        let _guard = self.ctx.exclusive();
        let mut threads = THREADS.load(&self.ctx)?;
        let before = threads.len();
        threads.retain(|t| t.id != thread_id);
        if threads.len() == before {
            return Err(thread_not_found(thread_id));
        }

        let mut messages = MESSAGES.load(&self.ctx)?;
        let count = messages.len();
        messages.retain(|m| m.thread_id != thread_id);
        if messages.len() != count {
            MESSAGES.save(&self.ctx, &messages)?;
        }
        THREADS.save(&self.ctx, &threads)?;
        tracing::info!(thread_id = %thread_id, messages = count - messages.len(), "Message thread deleted");
        Ok(())
    }
}

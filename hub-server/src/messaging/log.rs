//! MessagingLog
//!
//! Messages belong to an order and travel only between its two
//! participants. New messages are pushed to the order room as `new_message`.

use std::collections::{BTreeSet, HashMap};

use shared::event::OrderEvent;
use shared::models::{
    ConversationSummary, MAX_MESSAGE_LEN, MarkReadResult, Message, MessageCreate, Order,
};
use shared::order::Relation;
use shared::pagination::{PageRequest, PaginatedResponse};
use shared::util::{new_ordered_id, now_millis};
use shared::{AppError, AppResult, ErrorCode};

use crate::auth::{CurrentUser, authorize};
use crate::db::Stores;
use crate::notify::NotificationHub;
use crate::utils::validation::{MAX_URL_LEN, validate_required_text};

/// Default page size of a conversation
pub const DEFAULT_CONVERSATION_PAGE: u32 = 50;

#[derive(Clone)]
pub struct MessagingLog {
    stores: Stores,
    notifier: NotificationHub,
}

impl std::fmt::Debug for MessagingLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagingLog").finish_non_exhaustive()
    }
}

impl MessagingLog {
    pub fn new(stores: Stores, notifier: NotificationHub) -> Self {
        Self { stores, notifier }
    }

    async fn participant_order(&self, actor: &CurrentUser, order_id: &str) -> AppResult<Order> {
        let order = self
            .stores
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id)
            })?;
        authorize(&actor.id, &order, Relation::Either)?;
        Ok(order)
    }

    pub async fn send(&self, actor: &CurrentUser, input: MessageCreate) -> AppResult<Message> {
        let order = self.participant_order(actor, &input.order_id).await?;

        if input.receiver_id == actor.id {
            return Err(AppError::validation("Cannot send a message to yourself")
                .with_detail("field", "receiver_id"));
        }
        if order.counterpart(&actor.id) != Some(input.receiver_id.as_str()) {
            return Err(AppError::new(ErrorCode::InvalidRecipient)
                .with_detail("receiver_id", input.receiver_id.as_str()));
        }

        let content = input.content.trim().to_string();
        let file_url = match input.file_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => {
                validate_required_text(url, "file_url", MAX_URL_LEN)?;
                Some(url.to_string())
            }
            _ => None,
        };

        if input.message_type.needs_file() && file_url.is_none() {
            return Err(AppError::validation("File and image messages need a file_url")
                .with_detail("field", "file_url"));
        }
        if content.is_empty() && !input.message_type.needs_file() {
            return Err(AppError::new(ErrorCode::EmptyMessage));
        }
        if content.chars().count() > MAX_MESSAGE_LEN {
            return Err(AppError::validation(format!(
                "Message is too long (max {} characters)",
                MAX_MESSAGE_LEN
            ))
            .with_detail("field", "content"));
        }

        let message = Message {
            id: new_ordered_id(),
            order_id: order.id.clone(),
            sender_id: actor.id.clone(),
            receiver_id: input.receiver_id,
            content,
            message_type: input.message_type,
            file_url,
            is_read: false,
            read_at: None,
            created_at: now_millis(),
        };
        let message = self.stores.messages.create(message).await?;

        tracing::debug!(
            order_id = %message.order_id,
            message_id = %message.id,
            sender_id = %message.sender_id,
            "Message sent"
        );
        self.notifier
            .publish(&message.order_id, OrderEvent::NewMessage(message.clone()));
        Ok(message)
    }

    /// One page of an order's conversation, oldest first within the page.
    ///
    /// Unread messages on the page addressed to the actor are marked read
    /// with a single timestamp.
    pub async fn conversation(
        &self,
        actor: &CurrentUser,
        order_id: &str,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> AppResult<PaginatedResponse<Message>> {
        self.participant_order(actor, order_id).await?;

        let mut messages = self.stores.messages.find_by_order(order_id).await?;
        messages.reverse();
        let mut result = PageRequest::new(page, limit, DEFAULT_CONVERSATION_PAGE).slice(messages);
        result.data.reverse();

        let unread: Vec<String> = result
            .data
            .iter()
            .filter(|m| m.receiver_id == actor.id && !m.is_read)
            .map(|m| m.id.clone())
            .collect();

        if !unread.is_empty() {
            let read_at = now_millis();
            self.stores
                .messages
                .mark_read(&unread, &actor.id, read_at)
                .await?;
            for message in result.data.iter_mut().filter(|m| unread.contains(&m.id)) {
                message.is_read = true;
                message.read_at = Some(read_at);
            }
        }

        Ok(result)
    }

    /// One entry per order the actor has messages on, latest activity first
    pub async fn my_conversations(&self, actor: &CurrentUser) -> AppResult<Vec<ConversationSummary>> {
        let messages = self.stores.messages.find_by_participant(&actor.id).await?;

        let mut by_order: HashMap<String, ConversationSummary> = HashMap::new();
        for message in messages {
            let unread = u64::from(message.receiver_id == actor.id && !message.is_read);
            let counterpart = if message.sender_id == actor.id {
                message.receiver_id.clone()
            } else {
                message.sender_id.clone()
            };
            by_order
                .entry(message.order_id.clone())
                .and_modify(|summary| {
                    summary.unread_count += unread;
                    if message.created_at >= summary.last_message.created_at {
                        summary.last_message = message.clone();
                    }
                })
                .or_insert_with(|| ConversationSummary {
                    order_id: message.order_id.clone(),
                    counterpart_id: counterpart,
                    last_message: message.clone(),
                    unread_count: unread,
                });
        }

        let mut summaries: Vec<ConversationSummary> = by_order.into_values().collect();
        summaries.sort_by_key(|s| std::cmp::Reverse(s.last_message.created_at));
        Ok(summaries)
    }

    /// Mark messages addressed to the actor as read; returns how many changed
    pub async fn mark_read(&self, actor: &CurrentUser, message_ids: Vec<String>) -> AppResult<MarkReadResult> {
        if message_ids.is_empty() {
            return Err(AppError::validation("message_ids must not be empty")
                .with_detail("field", "message_ids"));
        }
        let ids: Vec<String> = message_ids
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let updated = self
            .stores
            .messages
            .mark_read(&ids, &actor.id, now_millis())
            .await?;
        Ok(MarkReadResult { updated })
    }

    /// Sender-only hard delete
    pub async fn delete(&self, actor: &CurrentUser, message_id: &str) -> AppResult<()> {
        let message = self
            .stores
            .messages
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::MessageNotFound).with_detail("message_id", message_id)
            })?;

        if message.sender_id != actor.id {
            return Err(AppError::forbidden("Only the sender can delete a message"));
        }

        self.stores.messages.delete(message_id).await?;
        tracing::info!(message_id, order_id = %message.order_id, "Message deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{OrderFixture, order_fixture, user};
    use shared::models::{MessageType, UserRole};

    fn text(order_id: &str, to: &str, content: &str) -> MessageCreate {
        MessageCreate {
            order_id: order_id.into(),
            receiver_id: to.into(),
            content: content.into(),
            message_type: MessageType::Text,
            file_url: None,
        }
    }

    fn log(f: &OrderFixture) -> MessagingLog {
        MessagingLog::new(f.stores.clone(), f.notifier.clone())
    }

    #[tokio::test]
    async fn test_send_between_participants() {
        let f = order_fixture().await;
        let log = log(&f);
        let mut sub = f.notifier.subscribe(&f.order.id);

        let message = log
            .send(&f.buyer, text(&f.order.id, &f.seller.id, "  Hello  "))
            .await
            .unwrap();
        assert_eq!(message.content, "Hello");
        assert!(!message.is_read);

        let envelope = sub.events.recv().await.unwrap();
        assert_eq!(envelope.event.name(), "new_message");
    }

    #[tokio::test]
    async fn test_rapid_messages_keep_send_order() {
        let f = order_fixture().await;
        let log = log(&f);

        let mut sent = Vec::new();
        for i in 0..40 {
            let (from, to) = if i % 2 == 0 {
                (&f.buyer, &f.seller)
            } else {
                (&f.seller, &f.buyer)
            };
            let message = log
                .send(from, text(&f.order.id, &to.id, &format!("msg {i}")))
                .await
                .unwrap();
            sent.push(message.id);
        }

        let page = log
            .conversation(&f.buyer, &f.order.id, Some(1), Some(50))
            .await
            .unwrap();
        let ids: Vec<String> = page.data.iter().map(|m| m.id.clone()).collect();
        assert_eq!(ids, sent);

        // newest page first, no overlap at page boundaries
        let first = log
            .conversation(&f.seller, &f.order.id, Some(1), Some(15))
            .await
            .unwrap();
        let second = log
            .conversation(&f.seller, &f.order.id, Some(2), Some(15))
            .await
            .unwrap();
        let first: Vec<&String> = first.data.iter().map(|m| &m.id).collect();
        let second: Vec<&String> = second.data.iter().map(|m| &m.id).collect();
        assert_eq!(first, sent[25..].iter().collect::<Vec<_>>());
        assert_eq!(second, sent[10..25].iter().collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_send_rejects_wrong_pairs() {
        let f = order_fixture().await;
        let log = log(&f);
        let stranger = user(&f.stores, "Eve", UserRole::Client).await;

        let err = log
            .send(&f.buyer, text(&f.order.id, &stranger.id, "hi"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRecipient);

        let err = log
            .send(&f.buyer, text(&f.order.id, &f.buyer.id, "hi"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let err = log
            .send(&stranger, text(&f.order.id, &f.seller.id, "hi"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotOrderParticipant);

        let err = log
            .send(&f.buyer, text("missing", &f.seller.id, "hi"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotFound);

        assert!(f.stores.messages.find_by_order(&f.order.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_content_rules() {
        let f = order_fixture().await;
        let log = log(&f);

        let err = log
            .send(&f.buyer, text(&f.order.id, &f.seller.id, "   "))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyMessage);

        let long = "x".repeat(MAX_MESSAGE_LEN + 1);
        let err = log
            .send(&f.buyer, text(&f.order.id, &f.seller.id, &long))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let mut file = text(&f.order.id, &f.seller.id, "");
        file.message_type = MessageType::File;
        let err = log.send(&f.buyer, file.clone()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        file.file_url = Some("/api/files/brief.pdf".into());
        let message = log.send(&f.buyer, file).await.unwrap();
        assert_eq!(message.file_url.as_deref(), Some("/api/files/brief.pdf"));
        assert!(message.content.is_empty());
    }

    #[tokio::test]
    async fn test_conversation_pages_and_marks_read() {
        let f = order_fixture().await;
        let log = log(&f);
        for i in 0..3 {
            log.send(&f.seller, text(&f.order.id, &f.buyer.id, &format!("m{i}")))
                .await
                .unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        // Latest two, oldest first
        let page = log
            .conversation(&f.buyer, &f.order.id, Some(1), Some(2))
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        let contents: Vec<&str> = page.data.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m1", "m2"]);
        assert!(page.data.iter().all(|m| m.is_read));
        assert_eq!(page.data[0].read_at, page.data[1].read_at);

        let stored = f.stores.messages.find_by_order(&f.order.id).await.unwrap();
        assert!(!stored[0].is_read);
        assert!(stored[1].is_read && stored[2].is_read);

        // Reading your own messages changes nothing
        log.conversation(&f.seller, &f.order.id, None, None)
            .await
            .unwrap();
        let stored = f.stores.messages.find_by_order(&f.order.id).await.unwrap();
        assert!(!stored[0].is_read);
    }

    #[tokio::test]
    async fn test_outsider_conversation_touches_nothing() {
        let f = order_fixture().await;
        let log = log(&f);
        log.send(&f.seller, text(&f.order.id, &f.buyer.id, "hi"))
            .await
            .unwrap();
        let stranger = user(&f.stores, "Eve", UserRole::Client).await;

        let err = log
            .conversation(&stranger, &f.order.id, None, None)
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), http::StatusCode::FORBIDDEN);

        let stored = f.stores.messages.find_by_order(&f.order.id).await.unwrap();
        assert!(stored.iter().all(|m| !m.is_read && m.read_at.is_none()));
    }

    #[tokio::test]
    async fn test_mark_read_is_idempotent() {
        let f = order_fixture().await;
        let log = log(&f);
        let to_buyer = log
            .send(&f.seller, text(&f.order.id, &f.buyer.id, "a"))
            .await
            .unwrap();
        let to_seller = log
            .send(&f.buyer, text(&f.order.id, &f.seller.id, "b"))
            .await
            .unwrap();

        let ids = vec![to_buyer.id.clone(), to_seller.id.clone(), to_buyer.id.clone()];
        let first = log.mark_read(&f.buyer, ids.clone()).await.unwrap();
        assert_eq!(first.updated, 1);
        let second = log.mark_read(&f.buyer, ids).await.unwrap();
        assert_eq!(second.updated, 0);

        let err = log.mark_read(&f.buyer, vec![]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_my_conversations() {
        let f = order_fixture().await;
        let log = log(&f);
        log.send(&f.seller, text(&f.order.id, &f.buyer.id, "first"))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        log.send(&f.seller, text(&f.order.id, &f.buyer.id, "second"))
            .await
            .unwrap();

        let inbox = log.my_conversations(&f.buyer).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].counterpart_id, f.seller.id);
        assert_eq!(inbox[0].last_message.content, "second");
        assert_eq!(inbox[0].unread_count, 2);

        let outbox = log.my_conversations(&f.seller).await.unwrap();
        assert_eq!(outbox[0].unread_count, 0);
        assert_eq!(outbox[0].counterpart_id, f.buyer.id);
    }

    #[tokio::test]
    async fn test_delete_is_sender_only() {
        let f = order_fixture().await;
        let log = log(&f);
        let message = log
            .send(&f.buyer, text(&f.order.id, &f.seller.id, "oops"))
            .await
            .unwrap();

        let err = log.delete(&f.seller, &message.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);

        log.delete(&f.buyer, &message.id).await.unwrap();
        let err = log.delete(&f.buyer, &message.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MessageNotFound);
    }
}

//! Message Model

use serde::{Deserialize, Serialize};

/// Longest accepted text body
pub const MAX_MESSAGE_LEN: usize = 2000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    #[default]
    Text,
    File,
    Image,
}

impl MessageType {
    /// File and image messages carry a `file_url`
    pub const fn needs_file(&self) -> bool {
        matches!(self, MessageType::File | MessageType::Image)
    }
}

/// Message entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub order_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub message_type: MessageType,
    pub file_url: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    pub read_at: Option<i64>,
    pub created_at: i64,
}

/// Send message payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageCreate {
    pub order_id: String,
    pub receiver_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub message_type: MessageType,
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkReadRequest {
    pub message_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkReadResult {
    pub updated: u64,
}

/// One entry of the actor's inbox
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub order_id: String,
    pub counterpart_id: String,
    pub last_message: Message,
    pub unread_count: u64,
}

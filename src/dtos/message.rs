//! Message DTOs

use crate::entities::{Message, MessageType, MessageView};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Outward representation of a message, read-receipt count included
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageDTO {
    pub message_id: i64,
    pub chat_id: i64,
    pub sender_id: i64,
    pub reply_to_message_id: Option<i64>,
    pub forward_from_message_id: Option<i64>,
    pub message_type: MessageType,
    pub content: Option<String>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub duration: Option<i64>,
    pub thumbnail_url: Option<String>,
    pub is_edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub read_count: i64,
}

impl MessageDTO {
    fn build(message: Message, read_count: i64) -> Self {
        Self {
            message_id: message.message_id,
            chat_id: message.chat_id,
            sender_id: message.sender_id,
            reply_to_message_id: message.reply_to_message_id,
            forward_from_message_id: message.forward_from_message_id,
            message_type: message.message_type,
            content: message.content,
            file_url: message.file_url,
            file_name: message.file_name,
            file_size: message.file_size,
            duration: message.duration,
            thumbnail_url: message.thumbnail_url,
            is_edited: message.is_edited,
            edited_at: message.edited_at,
            created_at: message.created_at,
            read_count,
        }
    }
}

impl From<Message> for MessageDTO {
    fn from(value: Message) -> Self {
        Self::build(value, 0)
    }
}

impl From<MessageView> for MessageDTO {
    fn from(value: MessageView) -> Self {
        Self::build(value.message, value.read_count)
    }
}

/// Input for AppendMessage. Text needs `content`, media types need
/// `file_url`; the cross-field rules live in the service.
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct AppendMessageDTO {
    pub chat_id: i64,
    pub message_type: MessageType,

    #[validate(length(min = 1, max = 4000, message = "Message content must be between 1 and 4000 characters"))]
    pub content: Option<String>,

    pub file_url: Option<String>,

    #[validate(length(max = 255, message = "File name must be at most 255 characters"))]
    pub file_name: Option<String>,

    #[validate(range(min = 0, message = "File size must not be negative"))]
    pub file_size: Option<i64>,

    #[validate(range(min = 0, message = "Duration must not be negative"))]
    pub duration: Option<i64>,

    pub thumbnail_url: Option<String>,
    pub reply_to_message_id: Option<i64>,
    pub forward_from_message_id: Option<i64>,
}

/// Full row for inserting a message; built by the service after the
/// gateway and cross-field checks have passed.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NewMessageDTO {
    pub chat_id: i64,
    pub sender_id: i64,
    pub reply_to_message_id: Option<i64>,
    pub forward_from_message_id: Option<i64>,
    pub message_type: MessageType,
    pub content: Option<String>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub duration: Option<i64>,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for EditMessage
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct EditMessageDTO {
    #[validate(length(min = 1, max = 4000, message = "Message content must be between 1 and 4000 characters"))]
    pub content: String,
}

//! Message entity
//!
//! Reply and forward links are id references, never owning pointers; a
//! deleted target leaves the reference NULL and readers resolve that as
//! "deleted". Forwards copy content at forward time, so they never chase
//! the original.

use super::enums::MessageType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Message {
    pub message_id: i64,
    pub chat_id: i64,
    pub sender_id: i64,
    /// Same-chat back-reference; NULL once the target is deleted.
    pub reply_to_message_id: Option<i64>,
    /// May point across chats; NULL once the source is deleted.
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
    pub updated_at: DateTime<Utc>,
}

/// A message joined with its read-receipt count, as returned by list/get
/// queries.
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct MessageView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub message: Message,
    pub read_count: i64,
}

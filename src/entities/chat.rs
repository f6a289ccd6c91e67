//! Chat entity

use super::enums::ChatType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Chat {
    pub chat_id: i64,
    pub chat_type: ChatType,
    /// Required for group/channel, always None for private chats.
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_by: i64,
    pub is_public: bool,
    /// Present only while the chat is public; regenerated on demand.
    pub invite_token: Option<String>,
    pub max_members: i64,
    pub created_at: DateTime<Utc>,
    /// Advances on every appended message, drives inbox ordering.
    pub updated_at: DateTime<Utc>,
}

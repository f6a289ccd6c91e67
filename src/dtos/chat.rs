//! Chat DTOs - Data Transfer Objects for conversations

use crate::dtos::membership::MemberDTO;
use crate::entities::{Chat, ChatType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Outward representation of a chat
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatDTO {
    pub chat_id: i64,
    pub chat_type: ChatType,
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_by: i64,
    pub is_public: bool,
    pub invite_token: Option<String>,
    pub max_members: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Active members, populated on get/create; None on list responses.
    pub members: Option<Vec<MemberDTO>>,
}

impl From<Chat> for ChatDTO {
    fn from(value: Chat) -> Self {
        Self {
            chat_id: value.chat_id,
            chat_type: value.chat_type,
            name: value.name,
            description: value.description,
            created_by: value.created_by,
            is_public: value.is_public,
            invite_token: value.invite_token,
            max_members: value.max_members,
            created_at: value.created_at,
            updated_at: value.updated_at,
            members: None,
        }
    }
}

/// Input for CreateChat. `member_ids` is the initial member list: for a
/// private chat exactly one peer, for group/channel any number (may be
/// empty). Name/description rules are cross-field and enforced in the
/// service.
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateChatDTO {
    pub chat_type: ChatType,

    #[validate(length(min = 1, max = 255, message = "Chat name must be between 1 and 255 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    pub is_public: bool,

    #[validate(range(min = 2, max = 1000, message = "max_members must be between 2 and 1000"))]
    pub max_members: Option<i64>,

    #[serde(default)]
    pub member_ids: Vec<i64>,
}

/// Full row for inserting a chat; built by the service after validation,
/// never deserialized from callers.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NewChatDTO {
    pub chat_type: ChatType,
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_by: i64,
    pub is_public: bool,
    pub invite_token: Option<String>,
    pub max_members: i64,
    pub created_at: DateTime<Utc>,
}

/// Input for UpdateChat: only these four fields are mutable.
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateChatDTO {
    #[validate(length(min = 1, max = 255, message = "Chat name must be between 1 and 255 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub is_public: Option<bool>,

    #[validate(range(min = 2, max = 1000, message = "max_members must be between 2 and 1000"))]
    pub max_members: Option<i64>,
}

//! Membership DTOs

use crate::entities::{ChatRole, Membership, MembershipState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat member joined with their username (in-memory join in the service)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MemberDTO {
    pub chat_id: i64,
    pub user_id: i64,
    pub username: Option<String>,
    pub role: ChatRole,
    pub state: MembershipState,
    pub joined_at: DateTime<Utc>,
}

impl From<Membership> for MemberDTO {
    fn from(value: Membership) -> Self {
        Self {
            chat_id: value.chat_id,
            user_id: value.user_id,
            username: None,
            role: value.role,
            state: value.state,
            joined_at: value.joined_at,
        }
    }
}

/// Input for AddMember. Role defaults to plain member; owner is never
/// assignable through this path.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AddMemberDTO {
    pub user_id: i64,
    #[serde(default)]
    pub role: Option<ChatRole>,
}

//! Membership entity - the (chat, user) pivot

use super::enums::{ChatRole, MembershipState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Membership {
    pub chat_id: i64,
    pub user_id: i64,
    pub role: ChatRole,
    pub state: MembershipState,
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    pub fn is_active(&self) -> bool {
        self.state == MembershipState::Active
    }
}

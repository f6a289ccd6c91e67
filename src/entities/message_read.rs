//! MessageRead entity - one row per (message, user), written at most once

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct MessageRead {
    pub message_id: i64,
    pub user_id: i64,
    pub read_at: DateTime<Utc>,
}

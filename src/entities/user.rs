//! User entity - read-only identity view
//!
//! The core only consults users for existence and active status; account
//! creation and credentials live in the external identity service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

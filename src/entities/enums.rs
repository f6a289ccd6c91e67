//! Enumerations - closed enums shared by entities and DTOs

use serde::{Deserialize, Serialize};

// ********************* DOMAIN ENUMERATIONS **********************//

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    Private,
    Group,
    Channel,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    Owner,
    Admin,
    Member,
}

/// Membership lifecycle state. A removed member keeps their row with
/// `Inactive` state so the (chat, user) pair stays unique forever.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MembershipState {
    Active,
    Inactive,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Image,
    Video,
    Audio,
    File,
    Voice,
    Location,
}

impl MessageType {
    /// Media types carry an attachment; text and location carry their
    /// payload in `content`.
    pub fn requires_attachment(&self) -> bool {
        !matches!(self, MessageType::Text | MessageType::Location)
    }
}

//! Entities module - persisted domain types
//!
//! Each entity mirrors one table of the backing store.

pub mod chat;
pub mod enums;
pub mod membership;
pub mod message;
pub mod message_read;
pub mod user;

// Re-exports to keep imports short
pub use chat::Chat;
pub use enums::{ChatRole, ChatType, MembershipState, MessageType};
pub use membership::Membership;
pub use message::{Message, MessageView};
pub use message_read::MessageRead;
pub use user::User;

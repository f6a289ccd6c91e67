//! DTOs module - Data Transfer Objects
//!
//! DTOs separate the external operation surface from the persisted
//! entities; all inputs carry their `validator` rules.

pub mod chat;
pub mod membership;
pub mod message;
pub mod query;

// Re-exports to keep imports short
pub use chat::{ChatDTO, CreateChatDTO, NewChatDTO, UpdateChatDTO};
pub use membership::{AddMemberDTO, MemberDTO};
pub use message::{AppendMessageDTO, EditMessageDTO, MessageDTO, NewMessageDTO};
pub use query::MessagesQuery;

//! Repositories module - one repository per persisted entity
//!
//! Repositories own the SQL; services above them never touch the pool
//! directly. Queries use the runtime API (`query_as::<_, T>`) so the
//! crate builds without a live database.

pub mod chat;
pub mod membership;
pub mod message;
pub mod message_read;
pub mod traits;
pub mod user;

// Re-export the traits so impl blocks read cleanly
pub use traits::{Create, Delete, Read, Update};

// Re-export the repository structs for short imports
pub use chat::ChatRepository;
pub use membership::{AddMemberOutcome, MembershipRepository};
pub use message::MessageRepository;
pub use message_read::MessageReadRepository;
pub use user::UserRepository;

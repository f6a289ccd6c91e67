//! Core Module - infrastructural components
//!
//! - Access gateway (membership/role checks)
//! - Configuration
//! - Error handling
//! - Application state

pub mod access;
pub mod config;
pub mod error;
pub mod state;
pub mod typing;

// Re-exports to keep imports short
pub use access::{require_active_member, require_message_access, require_role};
pub use config::Config;
pub use error::{AppError, ErrorKind};
pub use state::AppState;
pub use typing::TypingMap;

//! chatcore - message and membership consistency engine
//!
//! A transport-agnostic core for multi-user chats: conversation
//! lifecycle, capacity-bounded rosters with roles, an append-only
//! message log with replies and forwards, read receipts and ephemeral
//! typing indicators. Callers build an [`core::AppState`], then drive
//! everything through the functions in [`services`], always passing the
//! acting user's id.

pub mod core;
pub mod dtos;
pub mod entities;
pub mod events;
pub mod repositories;
pub mod services;

pub use core::{AppError, AppState, Config, ErrorKind};
pub use events::CoreEvent;

/// Install the tracing subscriber, filter taken from `RUST_LOG` with an
/// `info` fallback. Call once at startup; embedding applications that
/// bring their own subscriber skip this.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}

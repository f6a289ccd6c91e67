//! Presence services - read receipts and typing indicators

use crate::core::access::{require_active_member, require_message_access};
use crate::core::{AppError, AppState};
use crate::entities::MessageRead;
use chrono::{Duration, Utc};
use tracing::{debug, info, instrument};

/// Record that the actor read a message. Repeating the call changes
/// nothing.
#[instrument(skip(state))]
pub async fn mark_read(state: &AppState, actor: i64, message_id: i64) -> Result<(), AppError> {
    require_message_access(state, message_id, actor).await?;

    let newly_marked = state.reads.mark_read(message_id, actor).await?;
    if newly_marked {
        info!("Message {} marked read by user {}", message_id, actor);
    } else {
        debug!("Message {} was already read by user {}", message_id, actor);
    }

    Ok(())
}

/// Receipts for a message, visible to any member of its chat.
#[instrument(skip(state))]
pub async fn read_receipts(
    state: &AppState,
    actor: i64,
    message_id: i64,
) -> Result<Vec<MessageRead>, AppError> {
    require_message_access(state, message_id, actor).await?;
    Ok(state.reads.find_by_message(message_id).await?)
}

/// Number of distinct readers of a message.
#[instrument(skip(state))]
pub async fn read_count(state: &AppState, actor: i64, message_id: i64) -> Result<i64, AppError> {
    require_message_access(state, message_id, actor).await?;
    Ok(state.reads.count_for_message(message_id).await?)
}

#[instrument(skip(state))]
pub async fn start_typing(state: &AppState, actor: i64, chat_id: i64) -> Result<(), AppError> {
    require_active_member(state, chat_id, actor).await?;
    state.typing.start(chat_id, actor, Utc::now());
    Ok(())
}

/// Clear the actor's typing indicator. Deliberately unauthenticated
/// against the roster: clearing a stale indicator must still work after
/// the user has left the chat.
#[instrument(skip(state))]
pub async fn stop_typing(state: &AppState, actor: i64, chat_id: i64) -> Result<(), AppError> {
    state.typing.stop(chat_id, actor);
    Ok(())
}

/// Members currently typing in the chat, inside the TTL window.
#[instrument(skip(state))]
pub async fn active_typers(
    state: &AppState,
    actor: i64,
    chat_id: i64,
) -> Result<Vec<i64>, AppError> {
    require_active_member(state, chat_id, actor).await?;

    let ttl = Duration::seconds(state.config.typing_ttl_secs);
    Ok(state.typing.active_typers(chat_id, Utc::now(), ttl))
}

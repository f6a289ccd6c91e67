//! Access Gateway - the single authorization chokepoint
//!
//! Every service operation that takes an actor resolves its membership
//! here before touching the Conversation Store, Message Log or Delivery
//! Tracker. "Chat missing" and "actor is not an active member" collapse
//! into one NotFoundOrForbidden answer so chat existence never leaks to
//! outsiders.

use crate::core::{AppError, AppState};
use crate::entities::{ChatRole, Membership, Message};
use crate::repositories::Read;
use tracing::{debug, info, instrument, warn};

/// Resolve the actor's active membership in `chat_id`, or fail with the
/// combined not-found/forbidden error.
#[instrument(skip(state))]
pub async fn require_active_member(
    state: &AppState,
    chat_id: i64,
    user_id: i64,
) -> Result<Membership, AppError> {
    debug!("Checking chat membership");
    let membership = state
        .member
        .read(&(chat_id, user_id))
        .await?
        .filter(Membership::is_active)
        .ok_or_else(|| {
            warn!("User {} has no active membership in chat {}", user_id, chat_id);
            AppError::not_found_or_forbidden("Chat not found or access denied")
        })?;

    info!("User {} verified as member of chat {}", user_id, chat_id);
    Ok(membership)
}

/// Resolve a message id to the message plus the actor's membership in its
/// chat. A missing message and a message in a foreign chat are
/// indistinguishable to the caller.
#[instrument(skip(state))]
pub async fn require_message_access(
    state: &AppState,
    message_id: i64,
    user_id: i64,
) -> Result<(Message, Membership), AppError> {
    let message = state.msg.read(&message_id).await?.ok_or_else(|| {
        warn!("Message {} not found", message_id);
        AppError::not_found_or_forbidden("Message not found or access denied")
    })?;

    let membership = require_active_member(state, message.chat_id, user_id)
        .await
        .map_err(|_| AppError::not_found_or_forbidden("Message not found or access denied"))?;

    Ok((message, membership))
}

/// Check that a membership carries one of the allowed roles. Used only on
/// operations where the actor's membership itself is not secret.
#[instrument(skip(membership))]
pub fn require_role(membership: &Membership, allowed_roles: &[ChatRole]) -> Result<(), AppError> {
    if !allowed_roles.contains(&membership.role) {
        warn!(
            "User {} has insufficient role {:?} in chat {}, required one of: {:?}",
            membership.user_id, membership.role, membership.chat_id, allowed_roles
        );
        return Err(
            AppError::insufficient_permission("Insufficient role").with_details(format!(
                "This action requires one of the following roles: {:?}",
                allowed_roles
            )),
        );
    }

    Ok(())
}

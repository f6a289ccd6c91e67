//! Membership services - roster management
//!
//! Role rules in one place: owners manage everyone, admins manage plain
//! members, anybody may leave except the owner. The owner role is never
//! assigned or removed through these operations, so each chat keeps
//! exactly the owner it was created with.

use super::chat::hydrate_members;
use crate::core::access::{require_active_member, require_role};
use crate::core::{AppError, AppState};
use crate::dtos::{AddMemberDTO, MemberDTO};
use crate::entities::{ChatRole, ChatType};
use crate::events::CoreEvent;
use crate::repositories::{AddMemberOutcome, Read};
use tracing::{debug, info, instrument, warn};

/// Refuse roster mutation on private chats; their two members are fixed
/// at creation.
async fn require_mutable_roster(state: &AppState, chat_id: i64) -> Result<(), AppError> {
    let chat = state
        .chat
        .read(&chat_id)
        .await?
        .ok_or_else(|| AppError::not_found_or_forbidden("Chat not found or access denied"))?;

    if chat.chat_type == ChatType::Private {
        return Err(AppError::invalid_state(
            "Private chat membership cannot be changed",
        ));
    }
    Ok(())
}

#[instrument(skip(state, body), fields(actor = %actor, chat_id = %chat_id, target = %body.user_id))]
pub async fn add_member(
    state: &AppState,
    actor: i64,
    chat_id: i64,
    body: AddMemberDTO,
) -> Result<MemberDTO, AppError> {
    debug!("Adding member to chat");
    // 1. Resolve the actor's membership and check their role
    // 2. Validate the target user and the requested role
    // 3. Guarded insert or reactivation against the capacity limit
    let membership = require_active_member(state, chat_id, actor).await?;
    require_role(&membership, &[ChatRole::Owner, ChatRole::Admin])?;
    require_mutable_roster(state, chat_id).await?;

    let role = body.role.unwrap_or(ChatRole::Member);
    if role == ChatRole::Owner {
        return Err(AppError::validation("The owner role cannot be assigned"));
    }
    // only the owner may mint admins
    if role == ChatRole::Admin {
        require_role(&membership, &[ChatRole::Owner])?;
    }

    if !state.user.exists_active(body.user_id).await? {
        warn!("Target user {} not found or inactive", body.user_id);
        return Err(AppError::not_found_or_forbidden("User not found"));
    }

    match state
        .member
        .add_active_member(chat_id, body.user_id, role)
        .await?
    {
        AddMemberOutcome::Added(new_membership) => {
            let _ = state.events.send(CoreEvent::MemberAdded {
                chat_id,
                user_id: body.user_id,
                role,
            });
            info!("User {} added to chat {} as {:?}", body.user_id, chat_id, role);

            let mut dto = MemberDTO::from(new_membership);
            dto.username = state.user.read(&body.user_id).await?.map(|u| u.username);
            Ok(dto)
        }
        AddMemberOutcome::AlreadyMember => {
            Err(AppError::already_exists("User is already a member of this chat"))
        }
        AddMemberOutcome::CapacityExceeded => {
            warn!("Chat {} is at capacity", chat_id);
            Err(AppError::capacity_exceeded("Chat is full"))
        }
    }
}

#[instrument(skip(state), fields(actor = %actor, chat_id = %chat_id, target = %user_id))]
pub async fn remove_member(
    state: &AppState,
    actor: i64,
    chat_id: i64,
    user_id: i64,
) -> Result<(), AppError> {
    debug!("Removing member from chat");
    let membership = require_active_member(state, chat_id, actor).await?;
    require_mutable_roster(state, chat_id).await?;

    let target = state
        .member
        .read(&(chat_id, user_id))
        .await?
        .filter(|m| m.is_active())
        .ok_or_else(|| AppError::not_found_or_forbidden("User is not a member of this chat"))?;

    if target.role == ChatRole::Owner {
        warn!("Attempt to remove owner of chat {}", chat_id);
        return Err(AppError::invalid_state("The chat owner cannot be removed"));
    }

    if actor != user_id {
        // removing somebody else needs rank: admins reach plain members,
        // only the owner reaches admins
        require_role(&membership, &[ChatRole::Owner, ChatRole::Admin])?;
        if target.role == ChatRole::Admin {
            require_role(&membership, &[ChatRole::Owner])?;
        }
    }

    if !state.member.deactivate(chat_id, user_id).await? {
        return Err(AppError::not_found_or_forbidden(
            "User is not a member of this chat",
        ));
    }

    let _ = state.events.send(CoreEvent::MemberRemoved { chat_id, user_id });

    info!("User {} removed from chat {}", user_id, chat_id);
    Ok(())
}

#[instrument(skip(state), fields(actor = %actor, chat_id = %chat_id, target = %user_id, role = ?role))]
pub async fn change_role(
    state: &AppState,
    actor: i64,
    chat_id: i64,
    user_id: i64,
    role: ChatRole,
) -> Result<MemberDTO, AppError> {
    debug!("Changing member role");
    let membership = require_active_member(state, chat_id, actor).await?;
    require_role(&membership, &[ChatRole::Owner])?;
    require_mutable_roster(state, chat_id).await?;

    if role == ChatRole::Owner {
        return Err(AppError::validation("The owner role cannot be assigned"));
    }
    if user_id == actor {
        return Err(AppError::invalid_state("The owner cannot change their own role"));
    }

    let target = state
        .member
        .read(&(chat_id, user_id))
        .await?
        .filter(|m| m.is_active())
        .ok_or_else(|| AppError::not_found_or_forbidden("User is not a member of this chat"))?;

    if target.role == ChatRole::Owner {
        return Err(AppError::invalid_state("The owner's role cannot be changed"));
    }

    if !state.member.update_role(chat_id, user_id, role).await? {
        return Err(AppError::not_found_or_forbidden(
            "User is not a member of this chat",
        ));
    }

    let _ = state.events.send(CoreEvent::RoleChanged { chat_id, user_id, role });

    info!("User {} in chat {} is now {:?}", user_id, chat_id, role);

    let mut dto = MemberDTO::from(target);
    dto.role = role;
    dto.username = state.user.read(&user_id).await?.map(|u| u.username);
    Ok(dto)
}

#[instrument(skip(state))]
pub async fn list_members(
    state: &AppState,
    actor: i64,
    chat_id: i64,
) -> Result<Vec<MemberDTO>, AppError> {
    require_active_member(state, chat_id, actor).await?;

    let members = hydrate_members(state, chat_id).await?;
    info!("Retrieved {} members for chat {}", members.len(), chat_id);
    Ok(members)
}

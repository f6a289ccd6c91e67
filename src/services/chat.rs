//! Chat services - conversation lifecycle and invite links

use crate::core::access::{require_active_member, require_role};
use crate::core::{AppError, AppState};
use crate::dtos::{ChatDTO, CreateChatDTO, MemberDTO, NewChatDTO, UpdateChatDTO};
use crate::entities::{Chat, ChatRole, ChatType};
use crate::events::CoreEvent;
use crate::repositories::{AddMemberOutcome, Create, Delete, Read, Update};
use chrono::Utc;
use futures::future::try_join_all;
use lazy_static::lazy_static;
use rand::{Rng, distributions::Alphanumeric};
use regex::Regex;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

const DEFAULT_MAX_MEMBERS: i64 = 200;

lazy_static! {
    static ref INVITE_TOKEN_RE: Regex =
        Regex::new(r"^[A-Za-z0-9]{32}$").expect("invite token pattern is valid");
}

fn generate_invite_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Load the active roster and join usernames in memory.
pub(crate) async fn hydrate_members(state: &AppState, chat_id: i64) -> Result<Vec<MemberDTO>, AppError> {
    let memberships = state.member.find_active_by_chat_id(chat_id).await?;

    let users = try_join_all(
        memberships
            .iter()
            .map(|m| async move { state.user.read(&m.user_id).await }),
    )
    .await?;

    Ok(memberships
        .into_iter()
        .zip(users)
        .map(|(membership, user)| {
            let mut dto = MemberDTO::from(membership);
            dto.username = user.map(|u| u.username);
            dto
        })
        .collect())
}

async fn chat_with_members(state: &AppState, chat: Chat) -> Result<ChatDTO, AppError> {
    let members = hydrate_members(state, chat.chat_id).await?;
    let mut dto = ChatDTO::from(chat);
    dto.members = Some(members);
    Ok(dto)
}

#[instrument(skip(state, body), fields(actor = %actor, chat_type = ?body.chat_type))]
pub async fn create_chat(
    state: &AppState,
    actor: i64,
    body: CreateChatDTO,
) -> Result<ChatDTO, AppError> {
    debug!("Creating new chat");
    // 1. Validate field rules, then the cross-field ones per chat type
    // 2. Insert the chat row and the creator's owner membership
    // 3. Attach the requested initial members one by one
    // 4. Return the chat with its hydrated roster
    body.validate()?;

    if !state.user.exists_active(actor).await? {
        warn!("Unknown or inactive actor {}", actor);
        return Err(AppError::not_found_or_forbidden("User not found"));
    }

    let now = Utc::now();
    let new_chat = match body.chat_type {
        ChatType::Private => {
            if body.member_ids.len() != 1 || body.member_ids[0] == actor {
                warn!("Private chat creation with bad peer list");
                return Err(AppError::validation(
                    "Private chat requires exactly one other user",
                ));
            }
            let peer_id = body.member_ids[0];

            if !state.user.exists_active(peer_id).await? {
                return Err(AppError::not_found_or_forbidden("User not found"));
            }

            if state
                .chat
                .find_private_chat_between(actor, peer_id)
                .await?
                .is_some()
            {
                warn!(
                    "Private chat already exists between users {} and {}",
                    actor, peer_id
                );
                return Err(AppError::already_exists(
                    "A private chat between these users already exists",
                ));
            }

            // private chats carry no name, no invite link, fixed capacity
            NewChatDTO {
                chat_type: ChatType::Private,
                name: None,
                description: None,
                created_by: actor,
                is_public: false,
                invite_token: None,
                max_members: 2,
                created_at: now,
            }
        }

        ChatType::Group | ChatType::Channel => {
            if body.name.is_none() {
                return Err(AppError::validation("Group and channel chats require a name"));
            }

            NewChatDTO {
                chat_type: body.chat_type,
                name: body.name.clone(),
                description: body.description.clone(),
                created_by: actor,
                is_public: body.is_public,
                invite_token: body.is_public.then(generate_invite_token),
                max_members: body.max_members.unwrap_or(DEFAULT_MAX_MEMBERS),
                created_at: now,
            }
        }
    };

    let chat = state.chat.create(&new_chat).await?;
    debug!("Chat created with id {}", chat.chat_id);

    // The creator's owner membership is mandatory; a failure here is fatal
    // and the empty chat is rolled back.
    let owner_added = state
        .member
        .add_active_member(chat.chat_id, actor, ChatRole::Owner)
        .await?;
    if !matches!(owner_added, AddMemberOutcome::Added(_)) {
        state.chat.delete(&chat.chat_id).await?;
        return Err(AppError::internal("Failed to attach chat owner"));
    }

    // Initial members are best-effort: a vanished user or a full roster
    // skips that entry instead of failing the whole creation.
    for member_id in body.member_ids.iter().filter(|&&id| id != actor) {
        if !state.user.exists_active(*member_id).await? {
            warn!("Skipping unknown or inactive initial member {}", member_id);
            continue;
        }
        match state
            .member
            .add_active_member(chat.chat_id, *member_id, ChatRole::Member)
            .await?
        {
            AddMemberOutcome::Added(_) => {
                let _ = state.events.send(CoreEvent::MemberAdded {
                    chat_id: chat.chat_id,
                    user_id: *member_id,
                    role: ChatRole::Member,
                });
            }
            outcome => {
                warn!(
                    "Skipping initial member {}: {:?}",
                    member_id, outcome
                );
            }
        }
    }

    let _ = state.events.send(CoreEvent::ChatCreated {
        chat_id: chat.chat_id,
        created_by: actor,
    });

    info!("Chat {} created by user {}", chat.chat_id, actor);
    chat_with_members(state, chat).await
}

#[instrument(skip(state))]
pub async fn get_chat(state: &AppState, actor: i64, chat_id: i64) -> Result<ChatDTO, AppError> {
    require_active_member(state, chat_id, actor).await?;

    let chat = state
        .chat
        .read(&chat_id)
        .await?
        .ok_or_else(|| AppError::not_found_or_forbidden("Chat not found or access denied"))?;

    chat_with_members(state, chat).await
}

#[instrument(skip(state))]
pub async fn list_chats(state: &AppState, actor: i64) -> Result<Vec<ChatDTO>, AppError> {
    debug!("Listing chats for user");
    let chats = state.chat.find_many_for_user(actor).await?;

    info!("Successfully retrieved {} chats", chats.len());
    Ok(chats.into_iter().map(ChatDTO::from).collect())
}

#[instrument(skip(state, body), fields(actor = %actor, chat_id = %chat_id))]
pub async fn update_chat(
    state: &AppState,
    actor: i64,
    chat_id: i64,
    body: UpdateChatDTO,
) -> Result<ChatDTO, AppError> {
    debug!("Updating chat");
    body.validate()?;

    let membership = require_active_member(state, chat_id, actor).await?;
    require_role(&membership, &[ChatRole::Owner, ChatRole::Admin])?;

    let chat = state
        .chat
        .read(&chat_id)
        .await?
        .ok_or_else(|| AppError::not_found_or_forbidden("Chat not found or access denied"))?;

    if chat.chat_type == ChatType::Private {
        return Err(AppError::invalid_state("Private chats cannot be updated"));
    }

    // Shrinking below the current roster would strand members
    if let Some(max_members) = body.max_members {
        let active = state.member.count_active(chat_id).await?;
        if max_members < active {
            return Err(AppError::validation(
                "max_members cannot be lower than the current member count",
            ));
        }
    }

    let updated = state.chat.update(&chat_id, &body).await?;

    // Going public without a token mints one on the spot
    let updated = if updated.is_public && updated.invite_token.is_none() {
        let token = generate_invite_token();
        state.chat.set_invite_token(chat_id, Some(&token)).await?;
        state
            .chat
            .read(&chat_id)
            .await?
            .ok_or_else(|| AppError::internal("Chat vanished during update"))?
    } else {
        updated
    };

    info!("Chat {} updated by user {}", chat_id, actor);
    chat_with_members(state, updated).await
}

#[instrument(skip(state))]
pub async fn delete_chat(state: &AppState, actor: i64, chat_id: i64) -> Result<(), AppError> {
    let membership = require_active_member(state, chat_id, actor).await?;
    require_role(&membership, &[ChatRole::Owner])?;

    state.chat.delete(&chat_id).await?;

    let _ = state.events.send(CoreEvent::ChatDeleted { chat_id });

    info!("Chat {} deleted by user {}", chat_id, actor);
    Ok(())
}

/// Mint a fresh invite token, replacing any previous one.
#[instrument(skip(state))]
pub async fn generate_invite_link(
    state: &AppState,
    actor: i64,
    chat_id: i64,
) -> Result<String, AppError> {
    let membership = require_active_member(state, chat_id, actor).await?;
    require_role(&membership, &[ChatRole::Owner, ChatRole::Admin])?;

    let chat = state
        .chat
        .read(&chat_id)
        .await?
        .ok_or_else(|| AppError::not_found_or_forbidden("Chat not found or access denied"))?;

    if !chat.is_public {
        return Err(AppError::invalid_state(
            "Invite links are only available on public chats",
        ));
    }

    let token = generate_invite_token();
    state.chat.set_invite_token(chat_id, Some(&token)).await?;

    info!("Invite token rotated for chat {}", chat_id);
    Ok(token)
}

/// Join a public chat through its invite token. Joining a chat the user
/// is already an active member of is a conflict, same as AddMember.
#[instrument(skip(state, token), fields(actor = %actor))]
pub async fn join_by_invite_link(
    state: &AppState,
    actor: i64,
    token: &str,
) -> Result<ChatDTO, AppError> {
    debug!("Joining chat by invite token");
    if !INVITE_TOKEN_RE.is_match(token) {
        return Err(AppError::validation("Malformed invite token"));
    }

    if !state.user.exists_active(actor).await? {
        return Err(AppError::not_found_or_forbidden("User not found"));
    }

    let chat = state
        .chat
        .find_by_invite_token(token)
        .await?
        .ok_or_else(|| AppError::not_found_or_forbidden("Invalid invite token"))?;

    match state
        .member
        .add_active_member(chat.chat_id, actor, ChatRole::Member)
        .await?
    {
        AddMemberOutcome::Added(_) => {
            let _ = state.events.send(CoreEvent::MemberAdded {
                chat_id: chat.chat_id,
                user_id: actor,
                role: ChatRole::Member,
            });
            info!("User {} joined chat {} via invite", actor, chat.chat_id);
        }
        AddMemberOutcome::AlreadyMember => {
            debug!("User {} is already a member of chat {}", actor, chat.chat_id);
            return Err(AppError::already_exists(
                "User is already a member of this chat",
            ));
        }
        AddMemberOutcome::CapacityExceeded => {
            warn!("Chat {} is full", chat.chat_id);
            return Err(AppError::capacity_exceeded("Chat is full"));
        }
    }

    chat_with_members(state, chat).await
}

//! Message services - append, edit, delete, forward, history

use crate::core::access::{require_active_member, require_message_access};
use crate::core::{AppError, AppState};
use crate::dtos::{AppendMessageDTO, EditMessageDTO, MessageDTO, MessagesQuery, NewMessageDTO};
use crate::entities::MessageType;
use crate::events::CoreEvent;
use crate::repositories::{Create, Delete, Read};
use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

#[instrument(skip(state, body), fields(actor = %actor, chat_id = %body.chat_id, message_type = ?body.message_type))]
pub async fn append_message(
    state: &AppState,
    actor: i64,
    body: AppendMessageDTO,
) -> Result<MessageDTO, AppError> {
    debug!("Appending message");
    // 1. Field rules, then the per-type cross-field rules
    // 2. Gateway check on the target chat
    // 3. Resolve reply and forward references
    // 4. Insert, bump the chat's activity marker, publish the event
    body.validate()?;

    match body.message_type {
        MessageType::Text => {
            if body.content.as_deref().is_none_or(str::is_empty) {
                return Err(AppError::validation("Text messages require content"));
            }
        }
        kind if kind.requires_attachment() => {
            if body.file_url.is_none() {
                return Err(AppError::validation("This message type requires a file_url"));
            }
        }
        // location payloads travel in `content`, no attachment needed
        _ => {
            if body.content.is_none() && body.file_url.is_none() {
                return Err(AppError::validation("Message has no content"));
            }
        }
    }

    require_active_member(state, body.chat_id, actor).await?;

    // A reply target must live in the same chat; anything else reads as
    // not-found to avoid leaking other chats' message ids.
    if let Some(reply_id) = body.reply_to_message_id {
        let target = state.msg.read(&reply_id).await?;
        if target.is_none_or(|m| m.chat_id != body.chat_id) {
            warn!("Reply target {} not in chat {}", reply_id, body.chat_id);
            return Err(AppError::not_found_or_forbidden(
                "Reply target not found in this chat",
            ));
        }
    }

    // A forward origin only needs to be visible to the sender
    if let Some(source_id) = body.forward_from_message_id {
        require_message_access(state, source_id, actor).await?;
    }

    let now = Utc::now();
    let message = state
        .msg
        .create(&NewMessageDTO {
            chat_id: body.chat_id,
            sender_id: actor,
            reply_to_message_id: body.reply_to_message_id,
            forward_from_message_id: body.forward_from_message_id,
            message_type: body.message_type,
            content: body.content,
            file_url: body.file_url,
            file_name: body.file_name,
            file_size: body.file_size,
            duration: body.duration,
            thumbnail_url: body.thumbnail_url,
            created_at: now,
        })
        .await?;

    state.chat.touch(body.chat_id, now).await?;

    let _ = state.events.send(CoreEvent::MessageAppended {
        chat_id: message.chat_id,
        message_id: message.message_id,
        sender_id: actor,
    });

    info!(
        "Message {} appended to chat {} by user {}",
        message.message_id, message.chat_id, actor
    );
    Ok(MessageDTO::from(message))
}

#[instrument(skip(state))]
pub async fn get_message(
    state: &AppState,
    actor: i64,
    message_id: i64,
) -> Result<MessageDTO, AppError> {
    require_message_access(state, message_id, actor).await?;

    let view = state
        .msg
        .find_view(message_id)
        .await?
        .ok_or_else(|| AppError::not_found_or_forbidden("Message not found or access denied"))?;

    Ok(MessageDTO::from(view))
}

#[instrument(skip(state, query), fields(actor = %actor, chat_id = %chat_id))]
pub async fn list_messages(
    state: &AppState,
    actor: i64,
    chat_id: i64,
    query: MessagesQuery,
) -> Result<Vec<MessageDTO>, AppError> {
    debug!("Fetching chat messages");
    require_active_member(state, chat_id, actor).await?;

    let limit = query
        .page_size
        .unwrap_or(state.config.default_page_size)
        .clamp(1, state.config.max_page_size);

    let messages = state
        .msg
        .find_many_paginated(chat_id, query.before_id, limit)
        .await?;

    info!("Retrieved {} messages for chat", messages.len());
    Ok(messages.into_iter().map(MessageDTO::from).collect())
}

#[instrument(skip(state, body), fields(actor = %actor, message_id = %message_id))]
pub async fn edit_message(
    state: &AppState,
    actor: i64,
    message_id: i64,
    body: EditMessageDTO,
) -> Result<MessageDTO, AppError> {
    debug!("Editing message");
    body.validate()?;

    let (message, _) = require_message_access(state, message_id, actor).await?;

    if message.sender_id != actor {
        warn!("User {} tried to edit a foreign message", actor);
        return Err(AppError::insufficient_permission(
            "Only the sender can edit a message",
        ));
    }
    if message.message_type != MessageType::Text {
        return Err(AppError::invalid_state("Only text messages can be edited"));
    }

    state
        .msg
        .update_content(message_id, &body.content)
        .await?
        .ok_or_else(|| AppError::not_found_or_forbidden("Message not found or access denied"))?;

    // re-read as a view so the response carries the receipt count
    let view = state
        .msg
        .find_view(message_id)
        .await?
        .ok_or_else(|| AppError::not_found_or_forbidden("Message not found or access denied"))?;

    info!("Message {} edited by user {}", message_id, actor);
    Ok(MessageDTO::from(view))
}

#[instrument(skip(state), fields(actor = %actor, message_id = %message_id))]
pub async fn delete_message(
    state: &AppState,
    actor: i64,
    message_id: i64,
) -> Result<(), AppError> {
    debug!("Deleting message");
    let (message, _) = require_message_access(state, message_id, actor).await?;

    if message.sender_id != actor {
        warn!("User {} tried to delete a foreign message", actor);
        return Err(AppError::insufficient_permission(
            "Only the sender can delete a message",
        ));
    }

    state.msg.delete(&message_id).await?;

    info!("Message {} deleted by user {}", message_id, actor);
    Ok(())
}

/// Copy a visible message into another chat the actor belongs to. The
/// copy snapshots the source's payload, so later edits or deletion of
/// the source leave the forward untouched.
#[instrument(skip(state), fields(actor = %actor, source = %source_message_id, target_chat = %target_chat_id))]
pub async fn forward_message(
    state: &AppState,
    actor: i64,
    source_message_id: i64,
    target_chat_id: i64,
) -> Result<MessageDTO, AppError> {
    debug!("Forwarding message");
    let (source, _) = require_message_access(state, source_message_id, actor).await?;
    require_active_member(state, target_chat_id, actor).await?;

    let now = Utc::now();
    let message = state
        .msg
        .create(&NewMessageDTO {
            chat_id: target_chat_id,
            sender_id: actor,
            reply_to_message_id: None,
            forward_from_message_id: Some(source_message_id),
            message_type: source.message_type,
            content: source.content,
            file_url: source.file_url,
            file_name: source.file_name,
            file_size: source.file_size,
            duration: source.duration,
            thumbnail_url: source.thumbnail_url,
            created_at: now,
        })
        .await?;

    state.chat.touch(target_chat_id, now).await?;

    let _ = state.events.send(CoreEvent::MessageAppended {
        chat_id: target_chat_id,
        message_id: message.message_id,
        sender_id: actor,
    });

    info!(
        "Message {} forwarded to chat {} as message {}",
        source_message_id, target_chat_id, message.message_id
    );
    Ok(MessageDTO::from(message))
}

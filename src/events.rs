//! Core events - hook point for external notification dispatch
//!
//! The core publishes message-append and membership-change events on a
//! broadcast channel; push/email delivery is somebody else's job. Sending
//! is fire-and-forget: with no subscriber attached the event is dropped.

use crate::entities::ChatRole;
use serde::Serialize;

pub const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CoreEvent {
    ChatCreated {
        chat_id: i64,
        created_by: i64,
    },
    ChatDeleted {
        chat_id: i64,
    },
    MemberAdded {
        chat_id: i64,
        user_id: i64,
        role: ChatRole,
    },
    MemberRemoved {
        chat_id: i64,
        user_id: i64,
    },
    RoleChanged {
        chat_id: i64,
        user_id: i64,
        role: ChatRole,
    },
    MessageAppended {
        chat_id: i64,
        message_id: i64,
        sender_id: i64,
    },
}

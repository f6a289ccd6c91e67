//! Shared helpers for the integration suites

use chatcore::core::{AppState, Config};
use chatcore::dtos::CreateChatDTO;
use chatcore::entities::ChatType;
use sqlx::SqlitePool;

/// Build the core state over the test pool. `#[sqlx::test]` has already
/// run the migrations and fixtures at this point.
pub fn create_test_state(pool: SqlitePool) -> AppState {
    AppState::new(pool, Config::default())
}

/// Input for a plain group chat with no initial members.
pub fn group_chat_input(name: &str) -> CreateChatDTO {
    CreateChatDTO {
        chat_type: ChatType::Group,
        name: Some(name.to_string()),
        description: None,
        is_public: false,
        max_members: None,
        member_ids: Vec::new(),
    }
}

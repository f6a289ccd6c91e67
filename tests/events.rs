//! Integration tests for the core event channel

mod common;

#[cfg(test)]
mod event_tests {
    use super::common::*;
    use chatcore::CoreEvent;
    use chatcore::dtos::{AddMemberDTO, AppendMessageDTO};
    use chatcore::entities::{ChatRole, MessageType};
    use chatcore::services::{chat, membership, message};
    use sqlx::SqlitePool;

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "chats", "messages")))]
    async fn test_operations_publish_events(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let mut events = state.subscribe_events();

        membership::add_member(
            &state,
            1,
            1,
            AddMemberDTO {
                user_id: 5,
                role: None,
            },
        )
        .await
        .expect("add member");

        let appended = message::append_message(
            &state,
            1,
            AppendMessageDTO {
                chat_id: 1,
                message_type: MessageType::Text,
                content: Some("ping".to_string()),
                file_url: None,
                file_name: None,
                file_size: None,
                duration: None,
                thumbnail_url: None,
                reply_to_message_id: None,
                forward_from_message_id: None,
            },
        )
        .await
        .expect("append");

        assert_eq!(
            events.recv().await.expect("member event"),
            CoreEvent::MemberAdded {
                chat_id: 1,
                user_id: 5,
                role: ChatRole::Member,
            }
        );
        assert_eq!(
            events.recv().await.expect("message event"),
            CoreEvent::MessageAppended {
                chat_id: 1,
                message_id: appended.message_id,
                sender_id: 1,
            }
        );

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_events_without_subscribers_are_dropped(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);

        // nobody is listening; the operation must not care
        chat::create_chat(&state, 1, group_chat_input("Quiet"))
            .await
            .expect("create without subscribers");

        Ok(())
    }
}

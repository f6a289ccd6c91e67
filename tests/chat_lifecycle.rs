//! Integration tests for the conversation lifecycle
//!
//! Covers chat creation per type, visibility of private chats, updates,
//! deletion and the invite-link flow. `#[sqlx::test]` creates an
//! isolated database per test, applies `migrations/` and the listed
//! `fixtures/` scripts.

mod common;

#[cfg(test)]
mod chat_tests {
    use super::common::*;
    use chatcore::ErrorKind;
    use chatcore::dtos::{CreateChatDTO, UpdateChatDTO};
    use chatcore::entities::{ChatRole, ChatType};
    use chatcore::repositories::Read;
    use chatcore::services::chat;
    use sqlx::SqlitePool;

    // ============================================================
    // CreateChat
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_create_group_chat_makes_creator_owner(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);

        let mut input = group_chat_input("Team");
        input.member_ids = vec![2, 3];

        let dto = chat::create_chat(&state, 1, input).await.expect("create");

        assert_eq!(dto.chat_type, ChatType::Group);
        assert_eq!(dto.created_by, 1);

        let members = dto.members.expect("roster is hydrated on create");
        assert_eq!(members.len(), 3);
        let owner = members.iter().find(|m| m.user_id == 1).expect("creator");
        assert_eq!(owner.role, ChatRole::Owner);
        assert_eq!(owner.username.as_deref(), Some("alice"));

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_create_chat_skips_unknown_initial_members(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);

        let mut input = group_chat_input("Team");
        // dave (4) is deactivated, 999 does not exist
        input.member_ids = vec![2, 4, 999];

        let dto = chat::create_chat(&state, 1, input).await.expect("create");

        let members = dto.members.expect("roster is hydrated");
        let ids: Vec<i64> = members.iter().map(|m| m.user_id).collect();
        assert_eq!(ids, vec![1, 2]);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "chats")))]
    async fn test_create_duplicate_private_chat_conflicts(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);

        // alice and bob already share private chat 2
        let input = CreateChatDTO {
            chat_type: ChatType::Private,
            name: None,
            description: None,
            is_public: false,
            max_members: None,
            member_ids: vec![2],
        };

        let err = chat::create_chat(&state, 1, input)
            .await
            .expect_err("duplicate must be rejected");
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_create_private_chat_needs_exactly_one_peer(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);

        let input = CreateChatDTO {
            chat_type: ChatType::Private,
            name: None,
            description: None,
            is_public: false,
            max_members: None,
            member_ids: vec![2, 3],
        };

        let err = chat::create_chat(&state, 1, input)
            .await
            .expect_err("two peers must be rejected");
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_create_public_group_mints_invite_token(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);

        let mut input = group_chat_input("Open space");
        input.is_public = true;

        let dto = chat::create_chat(&state, 1, input).await.expect("create");

        let token = dto.invite_token.expect("public chat has a token");
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));

        Ok(())
    }

    // ============================================================
    // GetChat / ListChatsForUser - visibility
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "chats")))]
    async fn test_private_chat_is_invisible_to_outsiders(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);

        // charlie (3) is not in private chat 2; existence must not leak
        let err = chat::get_chat(&state, 3, 2)
            .await
            .expect_err("outsider must be refused");
        assert_eq!(err.kind(), ErrorKind::NotFoundOrForbidden);

        // a missing chat produces the exact same kind
        let err = chat::get_chat(&state, 3, 999).await.expect_err("missing chat");
        assert_eq!(err.kind(), ErrorKind::NotFoundOrForbidden);

        let chats = chat::list_chats(&state, 3).await.expect("list");
        assert!(chats.iter().all(|c| c.chat_id != 2));

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "chats")))]
    async fn test_inactive_member_loses_access(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);

        // erin (5) has an inactive row in chat 1
        let err = chat::get_chat(&state, 5, 1).await.expect_err("inactive member");
        assert_eq!(err.kind(), ErrorKind::NotFoundOrForbidden);

        Ok(())
    }

    // ============================================================
    // UpdateChat / DeleteChat
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "chats")))]
    async fn test_update_chat_requires_admin_rank(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);

        let patch = UpdateChatDTO {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };

        // charlie is a plain member
        let err = chat::update_chat(&state, 3, 1, patch.clone())
            .await
            .expect_err("member cannot update");
        assert_eq!(err.kind(), ErrorKind::InsufficientPermission);

        // bob is admin
        let dto = chat::update_chat(&state, 2, 1, patch).await.expect("admin updates");
        assert_eq!(dto.name.as_deref(), Some("Renamed"));

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "chats")))]
    async fn test_update_cannot_shrink_below_roster(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);

        // chat 3 has three active members
        let patch = UpdateChatDTO {
            max_members: Some(2),
            ..Default::default()
        };

        let err = chat::update_chat(&state, 1, 3, patch)
            .await
            .expect_err("shrinking below roster must fail");
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "chats")))]
    async fn test_going_private_revokes_invite_token(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);

        let patch = UpdateChatDTO {
            is_public: Some(false),
            ..Default::default()
        };

        let dto = chat::update_chat(&state, 1, 1, patch).await.expect("update");
        assert!(!dto.is_public);
        assert!(dto.invite_token.is_none());

        // the old token no longer resolves
        let err = chat::join_by_invite_link(&state, 4, "GeneralChatToken0000000000000000")
            .await
            .expect_err("revoked token");
        assert_eq!(err.kind(), ErrorKind::NotFoundOrForbidden);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "chats", "messages")))]
    async fn test_delete_chat_is_owner_only_and_cascades(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);

        // bob is admin, not owner
        let err = chat::delete_chat(&state, 2, 1).await.expect_err("admin cannot delete");
        assert_eq!(err.kind(), ErrorKind::InsufficientPermission);

        chat::delete_chat(&state, 1, 1).await.expect("owner deletes");

        assert!(state.chat.read(&1).await?.is_none());
        assert!(state.msg.read(&1).await?.is_none());
        assert!(state.member.read(&(1, 2)).await?.is_none());

        Ok(())
    }

    // ============================================================
    // Invite links
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "chats")))]
    async fn test_generate_invite_link_rotates_token(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);

        let token = chat::generate_invite_link(&state, 1, 1).await.expect("rotate");
        assert_ne!(token, "GeneralChatToken0000000000000000");

        // joining with the fresh token works, the stale one is dead
        chat::join_by_invite_link(&state, 5, &token).await.expect("join");
        let err = chat::join_by_invite_link(&state, 4, "GeneralChatToken0000000000000000")
            .await
            .expect_err("stale token");
        assert_eq!(err.kind(), ErrorKind::NotFoundOrForbidden);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "chats")))]
    async fn test_join_by_invite_link(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);

        // erin (5) was removed from chat 1 earlier; joining reactivates her
        let dto = chat::join_by_invite_link(&state, 5, "GeneralChatToken0000000000000000")
            .await
            .expect("join");
        assert_eq!(dto.chat_id, 1);

        let members = dto.members.expect("roster is hydrated");
        assert!(members.iter().any(|m| m.user_id == 5));

        // joining again is a conflict, not a silent no-op
        let err = chat::join_by_invite_link(&state, 5, "GeneralChatToken0000000000000000")
            .await
            .expect_err("repeat join");
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        // the roster is unchanged
        let dto = chat::get_chat(&state, 5, 1).await.expect("still a member");
        let members = dto.members.expect("roster is hydrated");
        assert_eq!(members.iter().filter(|m| m.user_id == 5).count(), 1);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "chats")))]
    async fn test_join_rejects_malformed_token(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);

        let err = chat::join_by_invite_link(&state, 5, "short").await.expect_err("bad token");
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);

        let err = chat::join_by_invite_link(&state, 5, "no-dashes-allowed-in-this-token!")
            .await
            .expect_err("bad charset");
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "chats")))]
    async fn test_join_full_chat_is_refused(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);

        // chat 3 is at its limit of 3
        let err = chat::join_by_invite_link(&state, 5, "LimitedChatToken0000000000000000")
            .await
            .expect_err("full chat");
        assert_eq!(err.kind(), ErrorKind::CapacityExceeded);

        Ok(())
    }
}

//! MembershipRepository - chat rosters
//!
//! Rows are soft-deleted: removing a member flips `state` to inactive so
//! the join date survives a later re-add. The composite primary key
//! (chat_id, user_id) is the uniqueness arbiter under concurrent joins.

use super::Read;
use crate::entities::{ChatRole, Membership, MembershipState};
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument};

/// What happened when a member was (re)added. The capacity check and the
/// insert run as one guarded statement, so under concurrent joins at the
/// boundary exactly one caller gets `Added`.
#[derive(Debug, Clone)]
pub enum AddMemberOutcome {
    Added(Membership),
    AlreadyMember,
    CapacityExceeded,
}

// MEMBERSHIP REPOSITORY
pub struct MembershipRepository {
    connection_pool: SqlitePool,
}

impl MembershipRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Insert or reactivate a membership, but only while the active
    /// roster is below `max_members`.
    ///
    /// Two guarded statements, each a no-op unless its precondition
    /// holds at execution time:
    ///   1. reactivate an inactive row if there is room
    ///   2. insert a fresh row if none exists and there is room
    /// If neither touched a row we diagnose after the fact: an active
    /// row means AlreadyMember, otherwise the roster was full.
    #[instrument(skip(self), fields(chat_id = %chat_id, user_id = %user_id, role = ?role))]
    pub async fn add_active_member(
        &self,
        chat_id: i64,
        user_id: i64,
        role: ChatRole,
    ) -> Result<AddMemberOutcome, Error> {
        debug!("Adding member to chat");
        let joined_at = Utc::now();

        // 1. Reactivation path: flip an inactive row back, capacity permitting
        let reactivated = sqlx::query(
            r#"
            UPDATE chat_members
            SET state = 'active', role = ?, joined_at = ?
            WHERE chat_id = ? AND user_id = ? AND state = 'inactive'
              AND (SELECT COUNT(*) FROM chat_members a
                   WHERE a.chat_id = chat_members.chat_id AND a.state = 'active')
                  < (SELECT max_members FROM chats WHERE chats.chat_id = chat_members.chat_id)
            "#,
        )
        .bind(role)
        .bind(joined_at)
        .bind(chat_id)
        .bind(user_id)
        .execute(&self.connection_pool)
        .await?;

        if reactivated.rows_affected() > 0 {
            info!("Membership reactivated");
            return Ok(AddMemberOutcome::Added(Membership {
                chat_id,
                user_id,
                role,
                state: MembershipState::Active,
                joined_at,
            }));
        }

        // 2. Fresh insert, guarded by the same capacity subquery
        let inserted = sqlx::query(
            r#"
            INSERT INTO chat_members (chat_id, user_id, role, state, joined_at)
            SELECT ?, ?, ?, 'active', ?
            WHERE NOT EXISTS (
                SELECT 1 FROM chat_members
                WHERE chat_id = ? AND user_id = ?
            )
            AND (SELECT COUNT(*) FROM chat_members WHERE chat_id = ? AND state = 'active')
                < (SELECT max_members FROM chats WHERE chat_id = ?)
            "#,
        )
        .bind(chat_id)
        .bind(user_id)
        .bind(role)
        .bind(joined_at)
        .bind(chat_id)
        .bind(user_id)
        .bind(chat_id)
        .bind(chat_id)
        .execute(&self.connection_pool)
        .await?;

        if inserted.rows_affected() > 0 {
            info!("Membership created");
            return Ok(AddMemberOutcome::Added(Membership {
                chat_id,
                user_id,
                role,
                state: MembershipState::Active,
                joined_at,
            }));
        }

        // 3. Nothing changed: tell the caller why
        let existing = self.read(&(chat_id, user_id)).await?;
        match existing {
            Some(m) if m.is_active() => {
                debug!("User is already an active member");
                Ok(AddMemberOutcome::AlreadyMember)
            }
            _ => {
                debug!("Chat is at capacity");
                Ok(AddMemberOutcome::CapacityExceeded)
            }
        }
    }

    /// Soft-remove a member. Returns false if no active row existed.
    #[instrument(skip(self))]
    pub async fn deactivate(&self, chat_id: i64, user_id: i64) -> Result<bool, Error> {
        let result = sqlx::query(
            "UPDATE chat_members SET state = 'inactive' \
             WHERE chat_id = ? AND user_id = ? AND state = 'active'",
        )
        .bind(chat_id)
        .bind(user_id)
        .execute(&self.connection_pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Change an active member's role. Returns false if no active row
    /// existed.
    #[instrument(skip(self))]
    pub async fn update_role(
        &self,
        chat_id: i64,
        user_id: i64,
        role: ChatRole,
    ) -> Result<bool, Error> {
        let result = sqlx::query(
            "UPDATE chat_members SET role = ? \
             WHERE chat_id = ? AND user_id = ? AND state = 'active'",
        )
        .bind(role)
        .bind(chat_id)
        .bind(user_id)
        .execute(&self.connection_pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Active roster for a chat, oldest join first.
    #[instrument(skip(self))]
    pub async fn find_active_by_chat_id(&self, chat_id: i64) -> Result<Vec<Membership>, Error> {
        let members = sqlx::query_as::<_, Membership>(
            r#"
            SELECT chat_id, user_id, role, state, joined_at
            FROM chat_members
            WHERE chat_id = ? AND state = 'active'
            ORDER BY joined_at ASC, user_id ASC
            "#,
        )
        .bind(chat_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(members)
    }

    /// Number of active members in a chat.
    #[instrument(skip(self))]
    pub async fn count_active(&self, chat_id: i64) -> Result<i64, Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM chat_members WHERE chat_id = ? AND state = 'active'",
        )
        .bind(chat_id)
        .fetch_one(&self.connection_pool)
        .await?;

        Ok(count)
    }
}

impl Read<Membership, (i64, i64)> for MembershipRepository {
    /// Keyed by (chat_id, user_id); returns inactive rows too.
    #[instrument(skip(self), fields(chat_id = %id.0, user_id = %id.1))]
    async fn read(&self, id: &(i64, i64)) -> Result<Option<Membership>, Error> {
        let membership = sqlx::query_as::<_, Membership>(
            "SELECT chat_id, user_id, role, state, joined_at \
             FROM chat_members WHERE chat_id = ? AND user_id = ?",
        )
        .bind(id.0)
        .bind(id.1)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(membership)
    }
}

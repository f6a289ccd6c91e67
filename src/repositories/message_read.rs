//! MessageReadRepository - read receipts
//!
//! A receipt is written at most once per (message, user); re-reading is
//! a no-op. INSERT OR IGNORE leans on the composite primary key so the
//! idempotence holds under concurrent marks too.

use crate::entities::MessageRead;
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{debug, instrument};

// MESSAGE READ REPOSITORY
pub struct MessageReadRepository {
    connection_pool: SqlitePool,
}

impl MessageReadRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Record that a user read a message. Returns true if the receipt
    /// was new, false if it already existed.
    #[instrument(skip(self))]
    pub async fn mark_read(&self, message_id: i64, user_id: i64) -> Result<bool, Error> {
        debug!("Marking message as read");
        let result = sqlx::query(
            "INSERT OR IGNORE INTO message_reads (message_id, user_id, read_at) \
             VALUES (?, ?, ?)",
        )
        .bind(message_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.connection_pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of distinct readers of a message.
    #[instrument(skip(self))]
    pub async fn count_for_message(&self, message_id: i64) -> Result<i64, Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM message_reads WHERE message_id = ?",
        )
        .bind(message_id)
        .fetch_one(&self.connection_pool)
        .await?;

        Ok(count)
    }

    /// All receipts for a message, earliest reader first.
    #[instrument(skip(self))]
    pub async fn find_by_message(&self, message_id: i64) -> Result<Vec<MessageRead>, Error> {
        let reads = sqlx::query_as::<_, MessageRead>(
            "SELECT message_id, user_id, read_at FROM message_reads \
             WHERE message_id = ? ORDER BY read_at ASC, user_id ASC",
        )
        .bind(message_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(reads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::SqlitePool;

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "chats", "messages")))]
    async fn test_mark_read_is_idempotent(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = MessageReadRepository::new(pool);

        // charlie reads message 1 twice; only the first mark counts
        assert!(repo.mark_read(1, 3).await?);
        assert!(!repo.mark_read(1, 3).await?);

        // bob's fixture receipt plus charlie's
        assert_eq!(repo.count_for_message(1).await?, 2);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "chats", "messages")))]
    async fn test_receipts_listed_per_message(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = MessageReadRepository::new(pool);

        let reads = repo.find_by_message(1).await?;
        assert_eq!(reads.len(), 1);
        assert_eq!(reads[0].user_id, 2);

        assert!(repo.find_by_message(2).await?.is_empty());

        Ok(())
    }
}

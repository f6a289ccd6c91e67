//! UserRepository - read-only view over the identity directory
//!
//! The core never inserts or mutates users; registration and credential
//! handling live outside. Only existence and active status matter here.

use super::Read;
use crate::entities::User;
use sqlx::{Error, SqlitePool};
use tracing::{debug, instrument};

// USER REPOSITORY
pub struct UserRepository {
    connection_pool: SqlitePool,
}

impl UserRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Whether the user exists and is active in the identity directory.
    #[instrument(skip(self))]
    pub async fn exists_active(&self, user_id: i64) -> Result<bool, Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE user_id = ? AND is_active = 1",
        )
        .bind(user_id)
        .fetch_one(&self.connection_pool)
        .await?;

        Ok(count > 0)
    }
}

impl Read<User, i64> for UserRepository {
    #[instrument(skip(self), fields(user_id = %id))]
    async fn read(&self, id: &i64) -> Result<Option<User>, Error> {
        debug!("Reading user by id");
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, username, is_active, created_at FROM users WHERE user_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::SqlitePool;

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users")))]
    async fn test_read_existing_user(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = UserRepository::new(pool);

        let user = repo.read(&1).await?.expect("alice should exist");
        assert_eq!(user.username, "alice");
        assert!(user.is_active);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users")))]
    async fn test_exists_active_rejects_deactivated_user(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = UserRepository::new(pool);

        // dave (user_id=4) exists but is deactivated
        assert!(repo.exists_active(1).await?);
        assert!(!repo.exists_active(4).await?);
        assert!(!repo.exists_active(999).await?);

        Ok(())
    }
}

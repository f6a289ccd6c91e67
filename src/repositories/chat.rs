//! ChatRepository - conversation store

use super::{Create, Delete, Read, Update};
use crate::dtos::{NewChatDTO, UpdateChatDTO};
use crate::entities::Chat;
use chrono::{DateTime, Utc};
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument};

const CHAT_COLUMNS: &str = "chat_id, chat_type, name, description, created_by, is_public, \
                            invite_token, max_members, created_at, updated_at";

// CHAT REPOSITORY
pub struct ChatRepository {
    connection_pool: SqlitePool,
}

impl ChatRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Get the private chat both users are active members of, if any.
    /// Single query with GROUP BY + HAVING instead of two membership
    /// lookups.
    #[instrument(skip(self), fields(user1 = %user1_id, user2 = %user2_id))]
    pub async fn find_private_chat_between(
        &self,
        user1_id: i64,
        user2_id: i64,
    ) -> Result<Option<Chat>, Error> {
        debug!("Finding private chat between two users");
        let chat = sqlx::query_as::<_, Chat>(
            r#"
            SELECT
                c.chat_id, c.chat_type, c.name, c.description, c.created_by,
                c.is_public, c.invite_token, c.max_members, c.created_at, c.updated_at
            FROM chats c
            INNER JOIN chat_members m ON c.chat_id = m.chat_id
            WHERE c.chat_type = 'private'
              AND m.state = 'active'
              AND m.user_id IN (?, ?)
            GROUP BY c.chat_id
            HAVING COUNT(DISTINCT m.user_id) = 2
            "#,
        )
        .bind(user1_id)
        .bind(user2_id)
        .fetch_optional(&self.connection_pool)
        .await?;

        if chat.is_some() {
            info!("Private chat found");
        } else {
            debug!("No private chat found");
        }

        Ok(chat)
    }

    /// Look up a public chat by its invite token.
    #[instrument(skip(self, token))]
    pub async fn find_by_invite_token(&self, token: &str) -> Result<Option<Chat>, Error> {
        let query = format!(
            "SELECT {CHAT_COLUMNS} FROM chats WHERE invite_token = ? AND is_public = 1"
        );
        sqlx::query_as::<_, Chat>(&query)
            .bind(token)
            .fetch_optional(&self.connection_pool)
            .await
    }

    /// All chats the user is an active member of, newest activity first
    /// (inbox ordering).
    #[instrument(skip(self))]
    pub async fn find_many_for_user(&self, user_id: i64) -> Result<Vec<Chat>, Error> {
        let chats = sqlx::query_as::<_, Chat>(
            r#"
            SELECT
                c.chat_id, c.chat_type, c.name, c.description, c.created_by,
                c.is_public, c.invite_token, c.max_members, c.created_at, c.updated_at
            FROM chats c
            INNER JOIN chat_members m ON c.chat_id = m.chat_id
            WHERE m.user_id = ? AND m.state = 'active'
            ORDER BY c.updated_at DESC, c.chat_id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(chats)
    }

    /// Advance the chat's `updated_at` marker (message-append side
    /// effect).
    #[instrument(skip(self))]
    pub async fn touch(&self, chat_id: i64, at: DateTime<Utc>) -> Result<(), Error> {
        sqlx::query("UPDATE chats SET updated_at = ? WHERE chat_id = ?")
            .bind(at)
            .bind(chat_id)
            .execute(&self.connection_pool)
            .await?;

        Ok(())
    }

    /// Overwrite the invite token; pass None to revoke it.
    #[instrument(skip(self, token))]
    pub async fn set_invite_token(
        &self,
        chat_id: i64,
        token: Option<&str>,
    ) -> Result<(), Error> {
        sqlx::query("UPDATE chats SET invite_token = ? WHERE chat_id = ?")
            .bind(token)
            .bind(chat_id)
            .execute(&self.connection_pool)
            .await?;

        Ok(())
    }
}

impl Create<Chat, NewChatDTO> for ChatRepository {
    #[instrument(skip(self, data), fields(chat_type = ?data.chat_type))]
    async fn create(&self, data: &NewChatDTO) -> Result<Chat, Error> {
        debug!("Creating new chat");
        let result = sqlx::query(
            r#"
            INSERT INTO chats
                (chat_type, name, description, created_by, is_public, invite_token,
                 max_members, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(data.chat_type)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.created_by)
        .bind(data.is_public)
        .bind(&data.invite_token)
        .bind(data.max_members)
        .bind(data.created_at)
        .bind(data.created_at)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_rowid();
        info!("Chat created with id {}", new_id);

        Ok(Chat {
            chat_id: new_id,
            chat_type: data.chat_type,
            name: data.name.clone(),
            description: data.description.clone(),
            created_by: data.created_by,
            is_public: data.is_public,
            invite_token: data.invite_token.clone(),
            max_members: data.max_members,
            created_at: data.created_at,
            updated_at: data.created_at,
        })
    }
}

impl Read<Chat, i64> for ChatRepository {
    #[instrument(skip(self), fields(chat_id = %id))]
    async fn read(&self, id: &i64) -> Result<Option<Chat>, Error> {
        debug!("Reading chat by id");
        let query = format!("SELECT {CHAT_COLUMNS} FROM chats WHERE chat_id = ?");
        sqlx::query_as::<_, Chat>(&query)
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Update<Chat, UpdateChatDTO, i64> for ChatRepository {
    #[instrument(skip(self, data), fields(chat_id = %id))]
    async fn update(&self, id: &i64, data: &UpdateChatDTO) -> Result<Chat, Error> {
        debug!("Updating chat");
        let current_chat = self.read(id).await?.ok_or(Error::RowNotFound)?;

        if data.name.is_none()
            && data.description.is_none()
            && data.is_public.is_none()
            && data.max_members.is_none()
        {
            debug!("No fields to update, returning current chat");
            return Ok(current_chat);
        }

        // Dynamic UPDATE via QueryBuilder; updated_at always advances so
        // config changes surface in inbox ordering.
        let mut query_builder = sqlx::QueryBuilder::new("UPDATE chats SET ");

        let mut separated = query_builder.separated(", ");
        if let Some(ref name) = data.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name);
        }
        if let Some(ref description) = data.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description);
        }
        if let Some(is_public) = data.is_public {
            separated.push("is_public = ");
            separated.push_bind_unseparated(is_public);
            // a chat that goes private loses its invite token
            if !is_public {
                separated.push("invite_token = NULL");
            }
        }
        if let Some(max_members) = data.max_members {
            separated.push("max_members = ");
            separated.push_bind_unseparated(max_members);
        }
        separated.push("updated_at = ");
        separated.push_bind_unseparated(Utc::now());

        query_builder.push(" WHERE chat_id = ");
        query_builder.push_bind(id);

        query_builder.build().execute(&self.connection_pool).await?;

        info!("Chat updated successfully");

        self.read(id).await?.ok_or(Error::RowNotFound)
    }
}

impl Delete<i64> for ChatRepository {
    #[instrument(skip(self), fields(chat_id = %id))]
    async fn delete(&self, id: &i64) -> Result<(), Error> {
        debug!("Deleting chat");
        // memberships, messages and read receipts go with it (FK cascade)
        sqlx::query("DELETE FROM chats WHERE chat_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        info!("Chat deleted successfully");
        Ok(())
    }
}

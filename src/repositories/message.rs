//! MessageRepository - chat history store
//!
//! Message ids come from an AUTOINCREMENT rowid, so ids within a chat
//! are strictly increasing in commit order and pagination can key on
//! the id alone.

use super::{Create, Delete, Read};
use crate::dtos::NewMessageDTO;
use crate::entities::{Message, MessageView};
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument};

const MESSAGE_COLUMNS: &str = "message_id, chat_id, sender_id, reply_to_message_id, \
                               forward_from_message_id, message_type, content, file_url, \
                               file_name, file_size, duration, thumbnail_url, is_edited, \
                               edited_at, created_at, updated_at";

// MESSAGE REPOSITORY
pub struct MessageRepository {
    connection_pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Read one message together with its read-receipt count.
    #[instrument(skip(self))]
    pub async fn find_view(&self, message_id: i64) -> Result<Option<MessageView>, Error> {
        let view = sqlx::query_as::<_, MessageView>(
            r#"
            SELECT
                m.message_id, m.chat_id, m.sender_id, m.reply_to_message_id,
                m.forward_from_message_id, m.message_type, m.content, m.file_url,
                m.file_name, m.file_size, m.duration, m.thumbnail_url, m.is_edited,
                m.edited_at, m.created_at, m.updated_at,
                (SELECT COUNT(*) FROM message_reads r
                 WHERE r.message_id = m.message_id) AS read_count
            FROM messages m
            WHERE m.message_id = ?
            "#,
        )
        .bind(message_id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(view)
    }

    /// Page of a chat's history, newest first. `before_id` excludes that
    /// message and everything after it; the caller clamps `limit`.
    #[instrument(skip(self), fields(chat_id = %chat_id))]
    pub async fn find_many_paginated(
        &self,
        chat_id: i64,
        before_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<MessageView>, Error> {
        debug!("Listing messages page");
        let mut query_builder = sqlx::QueryBuilder::new(
            r#"
            SELECT
                m.message_id, m.chat_id, m.sender_id, m.reply_to_message_id,
                m.forward_from_message_id, m.message_type, m.content, m.file_url,
                m.file_name, m.file_size, m.duration, m.thumbnail_url, m.is_edited,
                m.edited_at, m.created_at, m.updated_at,
                (SELECT COUNT(*) FROM message_reads r
                 WHERE r.message_id = m.message_id) AS read_count
            FROM messages m
            WHERE m.chat_id = "#,
        );
        query_builder.push_bind(chat_id);

        if let Some(before_id) = before_id {
            query_builder.push(" AND m.message_id < ");
            query_builder.push_bind(before_id);
        }

        query_builder.push(" ORDER BY m.message_id DESC LIMIT ");
        query_builder.push_bind(limit);

        let messages = query_builder
            .build_query_as::<MessageView>()
            .fetch_all(&self.connection_pool)
            .await?;

        Ok(messages)
    }

    /// Rewrite a message's content and mark it edited. Returns the
    /// updated row, or None if the message vanished in between.
    #[instrument(skip(self, content))]
    pub async fn update_content(
        &self,
        message_id: i64,
        content: &str,
    ) -> Result<Option<Message>, Error> {
        let now = Utc::now();
        sqlx::query(
            "UPDATE messages \
             SET content = ?, is_edited = 1, edited_at = ?, updated_at = ? \
             WHERE message_id = ?",
        )
        .bind(content)
        .bind(now)
        .bind(now)
        .bind(message_id)
        .execute(&self.connection_pool)
        .await?;

        self.read(&message_id).await
    }
}

impl Create<Message, NewMessageDTO> for MessageRepository {
    #[instrument(skip(self, data), fields(chat_id = %data.chat_id, message_type = ?data.message_type))]
    async fn create(&self, data: &NewMessageDTO) -> Result<Message, Error> {
        debug!("Appending message");
        let result = sqlx::query(
            r#"
            INSERT INTO messages
                (chat_id, sender_id, reply_to_message_id, forward_from_message_id,
                 message_type, content, file_url, file_name, file_size, duration,
                 thumbnail_url, is_edited, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(data.chat_id)
        .bind(data.sender_id)
        .bind(data.reply_to_message_id)
        .bind(data.forward_from_message_id)
        .bind(data.message_type)
        .bind(&data.content)
        .bind(&data.file_url)
        .bind(&data.file_name)
        .bind(data.file_size)
        .bind(data.duration)
        .bind(&data.thumbnail_url)
        .bind(data.created_at)
        .bind(data.created_at)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_rowid();
        info!("Message appended with id {}", new_id);

        Ok(Message {
            message_id: new_id,
            chat_id: data.chat_id,
            sender_id: data.sender_id,
            reply_to_message_id: data.reply_to_message_id,
            forward_from_message_id: data.forward_from_message_id,
            message_type: data.message_type,
            content: data.content.clone(),
            file_url: data.file_url.clone(),
            file_name: data.file_name.clone(),
            file_size: data.file_size,
            duration: data.duration,
            thumbnail_url: data.thumbnail_url.clone(),
            is_edited: false,
            edited_at: None,
            created_at: data.created_at,
            updated_at: data.created_at,
        })
    }
}

impl Read<Message, i64> for MessageRepository {
    #[instrument(skip(self), fields(message_id = %id))]
    async fn read(&self, id: &i64) -> Result<Option<Message>, Error> {
        let query = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE message_id = ?");
        sqlx::query_as::<_, Message>(&query)
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Delete<i64> for MessageRepository {
    /// Delete a message; replies and forwards pointing at it keep their
    /// own rows with the reference nulled out, all in one transaction.
    #[instrument(skip(self), fields(message_id = %id))]
    async fn delete(&self, id: &i64) -> Result<(), Error> {
        debug!("Deleting message");
        let mut tx = self.connection_pool.begin().await?;

        sqlx::query("UPDATE messages SET reply_to_message_id = NULL WHERE reply_to_message_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE messages SET forward_from_message_id = NULL WHERE forward_from_message_id = ?",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM messages WHERE message_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Message deleted successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::MessageType;
    use sqlx::SqlitePool;

    /*------------------------------------------- */
    /* Unit tests: pagination                      */
    /*------------------------------------------- */

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "chats", "messages")))]
    async fn test_pagination_newest_first(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = MessageRepository::new(pool);

        let page = repo.find_many_paginated(1, None, 50).await?;

        // chat 1 holds messages 1..=3, newest first
        let ids: Vec<i64> = page.iter().map(|v| v.message.message_id).collect();
        assert_eq!(ids, vec![3, 2, 1]);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "chats", "messages")))]
    async fn test_pagination_before_id_excludes_anchor(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = MessageRepository::new(pool);

        let page = repo.find_many_paginated(1, Some(3), 2).await?;

        let ids: Vec<i64> = page.iter().map(|v| v.message.message_id).collect();
        assert_eq!(ids, vec![2, 1]);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "chats", "messages")))]
    async fn test_pagination_respects_chat_boundary(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = MessageRepository::new(pool);

        // message 4 belongs to chat 2, never chat 1
        let page = repo.find_many_paginated(2, None, 50).await?;

        assert_eq!(page.len(), 1);
        assert_eq!(page[0].message.message_id, 4);

        Ok(())
    }

    /*------------------------------------------- */
    /* Unit tests: read counts and deletion        */
    /*------------------------------------------- */

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "chats", "messages")))]
    async fn test_view_carries_read_count(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = MessageRepository::new(pool);

        // bob has read message 1; nobody read message 2
        let view = repo.find_view(1).await?.expect("message 1 exists");
        assert_eq!(view.read_count, 1);

        let view = repo.find_view(2).await?.expect("message 2 exists");
        assert_eq!(view.read_count, 0);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "chats", "messages")))]
    async fn test_delete_nulls_reply_references(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = MessageRepository::new(pool);

        // message 2 replies to message 1
        repo.delete(&1).await?;

        let reply = repo.read(&2).await?.expect("reply survives");
        assert!(reply.reply_to_message_id.is_none());
        assert!(repo.read(&1).await?.is_none());

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "chats", "messages")))]
    async fn test_edit_marks_message(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = MessageRepository::new(pool);

        let updated = repo
            .update_content(1, "hello edited")
            .await?
            .expect("message 1 exists");

        assert_eq!(updated.content.as_deref(), Some("hello edited"));
        assert!(updated.is_edited);
        assert!(updated.edited_at.is_some());
        assert_eq!(updated.message_type, MessageType::Text);

        Ok(())
    }
}

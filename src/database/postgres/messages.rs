use async_trait::async_trait;

use super::PgStore;
use crate::database::manager::DatabaseError;
use crate::database::models::{Message, NewMessage};
use crate::database::store::MessageStore;

#[async_trait]
impl MessageStore for PgStore {
    async fn create_message(&self, message: NewMessage) -> Result<Message, DatabaseError> {
        let created = sqlx::query_as::<_, Message>(
            "INSERT INTO messages (sender_id, receiver_id, text) VALUES ($1, $2, $3)
             RETURNING id, sender_id, receiver_id, text, created_at",
        )
        .bind(message.sender_id)
        .bind(message.receiver_id)
        .bind(&message.text)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn messages_involving(&self, user_id: i64) -> Result<Vec<Message>, DatabaseError> {
        // Single-key sort; ties come back in whatever order the scan produces
        let messages = sqlx::query_as::<_, Message>(
            "SELECT id, sender_id, receiver_id, text, created_at FROM messages
             WHERE sender_id = $1 OR receiver_id = $1
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    async fn messages_between(&self, user_id: i64, peer_id: i64) -> Result<Vec<Message>, DatabaseError> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT id, sender_id, receiver_id, text, created_at FROM messages
             WHERE (sender_id = $1 AND receiver_id = $2) OR (sender_id = $2 AND receiver_id = $1)
             ORDER BY created_at ASC",
        )
        .bind(user_id)
        .bind(peer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }
}

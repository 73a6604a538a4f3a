use async_trait::async_trait;

use super::PgStore;
use crate::database::manager::DatabaseError;
use crate::database::models::Notification;
use crate::database::store::NotificationStore;

const COLUMNS: &str = "id, receiver_id, message, is_read, created_at, updated_at";

#[async_trait]
impl NotificationStore for PgStore {
    async fn find_notification(&self, receiver_id: i64, message: &str) -> Result<Option<Notification>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM notifications WHERE receiver_id = $1 AND message = $2 ORDER BY id LIMIT 1",
            COLUMNS
        );
        let found = sqlx::query_as::<_, Notification>(&sql)
            .bind(receiver_id)
            .bind(message)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found)
    }

    async fn create_notification(&self, receiver_id: i64, message: &str) -> Result<Notification, DatabaseError> {
        let sql = format!(
            "INSERT INTO notifications (receiver_id, message) VALUES ($1, $2) RETURNING {}",
            COLUMNS
        );
        let created = sqlx::query_as::<_, Notification>(&sql)
            .bind(receiver_id)
            .bind(message)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn notifications_for(&self, receiver_id: i64) -> Result<Vec<Notification>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM notifications WHERE receiver_id = $1 ORDER BY created_at DESC",
            COLUMNS
        );
        let rows = sqlx::query_as::<_, Notification>(&sql)
            .bind(receiver_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn mark_notification_read(&self, id: i64, receiver_id: i64) -> Result<Option<Notification>, DatabaseError> {
        let sql = format!(
            "UPDATE notifications SET is_read = true, updated_at = now()
             WHERE id = $1 AND receiver_id = $2
             RETURNING {}",
            COLUMNS
        );
        let updated = sqlx::query_as::<_, Notification>(&sql)
            .bind(id)
            .bind(receiver_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn mark_all_notifications_read(&self, receiver_id: i64) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true, updated_at = now() WHERE receiver_id = $1 AND is_read = false",
        )
        .bind(receiver_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_notification(&self, id: i64, receiver_id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND receiver_id = $2")
            .bind(id)
            .bind(receiver_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

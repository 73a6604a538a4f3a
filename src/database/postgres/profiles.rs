use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use super::PgStore;
use crate::database::manager::DatabaseError;
use crate::database::models::{Attachment, NewAttachment, Portfolio, PortfolioLinks};
use crate::database::store::{ProfileStore, ProfileTransaction};

const ATTACHMENT_COLUMNS: &str = "id, user_id, file_name, file_path, mime_type, file_size, created_at";
const PORTFOLIO_COLUMNS: &str = "id, user_id, github_link, linked_in_link, updated_at";

/// Profile upload running inside one database transaction
pub struct PgProfileTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ProfileTransaction for PgProfileTransaction {
    async fn insert_attachment(&mut self, attachment: NewAttachment) -> Result<Attachment, DatabaseError> {
        let sql = format!(
            "INSERT INTO attachments (user_id, file_name, file_path, mime_type, file_size)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            ATTACHMENT_COLUMNS
        );
        let created = sqlx::query_as::<_, Attachment>(&sql)
            .bind(attachment.user_id)
            .bind(&attachment.file_name)
            .bind(&attachment.file_path)
            .bind(&attachment.mime_type)
            .bind(attachment.file_size)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(created)
    }

    async fn upsert_portfolio(&mut self, user_id: i64, links: &PortfolioLinks) -> Result<Portfolio, DatabaseError> {
        let sql = format!(
            "INSERT INTO portfolios (user_id, github_link, linked_in_link) VALUES ($1, $2, $3)
             ON CONFLICT (user_id) DO UPDATE SET
                github_link = COALESCE(EXCLUDED.github_link, portfolios.github_link),
                linked_in_link = COALESCE(EXCLUDED.linked_in_link, portfolios.linked_in_link),
                updated_at = now()
             RETURNING {}",
            PORTFOLIO_COLUMNS
        );
        let portfolio = sqlx::query_as::<_, Portfolio>(&sql)
            .bind(user_id)
            .bind(&links.github_link)
            .bind(&links.linked_in_link)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(portfolio)
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn begin_profile_update(&self) -> Result<Box<dyn ProfileTransaction>, DatabaseError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgProfileTransaction { tx }))
    }

    async fn attachments_for(&self, user_id: i64) -> Result<Vec<Attachment>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM attachments WHERE user_id = $1 ORDER BY created_at DESC",
            ATTACHMENT_COLUMNS
        );
        let rows = sqlx::query_as::<_, Attachment>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_attachment(&self, id: i64) -> Result<Option<Attachment>, DatabaseError> {
        let sql = format!("SELECT {} FROM attachments WHERE id = $1", ATTACHMENT_COLUMNS);
        let found = sqlx::query_as::<_, Attachment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found)
    }

    async fn portfolio_for(&self, user_id: i64) -> Result<Option<Portfolio>, DatabaseError> {
        let sql = format!("SELECT {} FROM portfolios WHERE user_id = $1", PORTFOLIO_COLUMNS);
        let found = sqlx::query_as::<_, Portfolio>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found)
    }

    async fn update_portfolio(&self, id: i64, links: &PortfolioLinks) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE portfolios SET
                github_link = COALESCE($2, github_link),
                linked_in_link = COALESCE($3, linked_in_link),
                updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(&links.github_link)
        .bind(&links.linked_in_link)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_attachment(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM attachments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_portfolio(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM portfolios WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

use async_trait::async_trait;

use super::PgStore;
use crate::database::manager::DatabaseError;
use crate::database::models::{NewPreference, Preference, PreferenceField, PreferenceUpdate};
use crate::database::store::PreferenceStore;

#[async_trait]
impl PreferenceStore for PgStore {
    async fn create_preference(&self, preference: NewPreference) -> Result<Preference, DatabaseError> {
        let created = sqlx::query_as::<_, Preference>(
            "INSERT INTO preferences (user_id, employment_type, location, shift, workplace)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, user_id, employment_type, location, shift, workplace, created_at, updated_at",
        )
        .bind(preference.user_id)
        .bind(&preference.employment_type)
        .bind(&preference.location)
        .bind(&preference.shift)
        .bind(&preference.workplace)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn preferences_for(&self, user_id: i64) -> Result<Vec<Preference>, DatabaseError> {
        let rows = sqlx::query_as::<_, Preference>(
            "SELECT id, user_id, employment_type, location, shift, workplace, created_at, updated_at
             FROM preferences WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update_preference(&self, id: i64, changes: PreferenceUpdate) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE preferences SET
                user_id = COALESCE($2, user_id),
                employment_type = COALESCE($3, employment_type),
                location = COALESCE($4, location),
                shift = COALESCE($5, shift),
                workplace = COALESCE($6, workplace),
                updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(changes.user_id)
        .bind(&changes.employment_type)
        .bind(&changes.location)
        .bind(&changes.shift)
        .bind(&changes.workplace)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_preference_field(&self, id: i64, field: PreferenceField) -> Result<bool, DatabaseError> {
        // Column name comes from a closed enum, never from the request
        let sql = format!(
            "UPDATE preferences SET {} = '', updated_at = now() WHERE id = $1",
            field.column()
        );
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

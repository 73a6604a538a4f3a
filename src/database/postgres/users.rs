use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgConnection, Row};

use super::PgStore;
use crate::database::manager::DatabaseError;
use crate::database::models::{
    Applicant, AppliedJob, NewUser, PeerInfo, StatusChange, User, UserUpdate,
};
use crate::database::store::{ApplicationStore, UserStore};

const USER_COLUMNS: &str = "id, user_id, full_name, gender, email, phone, location, birth_date, pincode, created_at, updated_at";

async fn load_applications(conn: &mut PgConnection, user_id: i64) -> Result<Vec<AppliedJob>, DatabaseError> {
    let rows = sqlx::query("SELECT entry FROM applications WHERE user_id = $1 ORDER BY position")
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

    rows.into_iter()
        .map(|row| {
            row.try_get::<Json<AppliedJob>, _>("entry")
                .map(|Json(entry)| entry)
                .map_err(DatabaseError::from)
        })
        .collect()
}

async fn user_exists(conn: &mut PgConnection, user_id: i64) -> Result<bool, DatabaseError> {
    let found = sqlx::query("SELECT 1 FROM users WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let taken = sqlx::query("SELECT 1 FROM users WHERE email = $1")
            .bind(&user.email)
            .fetch_optional(&self.pool)
            .await?;
        if taken.is_some() {
            return Err(DatabaseError::Conflict("Email already in use".to_string()));
        }

        let sql = format!(
            "INSERT INTO users (user_id, full_name, gender, email, phone, location, birth_date, pincode)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(user.user_id)
            .bind(&user.full_name)
            .bind(&user.gender)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(&user.location)
            .bind(user.birth_date)
            .bind(&user.pincode)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::unique_violation(e, "User already exists"))
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;

        let sql = format!("SELECT {} FROM users WHERE user_id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?;

        match user {
            Some(mut user) => {
                user.applied_for = load_applications(&mut conn, user_id).await?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    async fn update_user(&self, user_id: i64, changes: UserUpdate) -> Result<Option<User>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;

        let sql = format!(
            "UPDATE users SET
                full_name = COALESCE($2, full_name),
                gender = COALESCE($3, gender),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                location = COALESCE($6, location),
                birth_date = COALESCE($7, birth_date),
                pincode = COALESCE($8, pincode),
                updated_at = now()
             WHERE user_id = $1
             RETURNING {}",
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .bind(&changes.full_name)
            .bind(&changes.gender)
            .bind(&changes.email)
            .bind(&changes.phone)
            .bind(&changes.location)
            .bind(changes.birth_date)
            .bind(&changes.pincode)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| DatabaseError::unique_violation(e, "Email already in use"))?;

        match user {
            Some(mut user) => {
                user.applied_for = load_applications(&mut conn, user_id).await?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    async fn delete_user(&self, user_id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn peer_info(&self, user_ids: &[i64]) -> Result<Vec<PeerInfo>, DatabaseError> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let peers = sqlx::query_as::<_, PeerInfo>("SELECT user_id, full_name FROM users WHERE user_id = ANY($1)")
            .bind(user_ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(peers)
    }
}

#[async_trait]
impl ApplicationStore for PgStore {
    async fn applications(&self, user_id: i64) -> Result<Option<Vec<AppliedJob>>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        if !user_exists(&mut conn, user_id).await? {
            return Ok(None);
        }
        load_applications(&mut conn, user_id).await.map(Some)
    }

    async fn replace_applications(
        &self,
        user_id: i64,
        entries: Vec<AppliedJob>,
    ) -> Result<Option<Vec<AppliedJob>>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        // Lock the owner row so concurrent replacements serialize
        let owner = sqlx::query("SELECT 1 FROM users WHERE user_id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if owner.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query("DELETE FROM applications WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for (position, entry) in entries.iter().enumerate() {
            sqlx::query("INSERT INTO applications (user_id, position, job_key, entry) VALUES ($1, $2, $3, $4)")
                .bind(user_id)
                .bind(position as i32)
                .bind(entry.key())
                .bind(Json(entry))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(Some(entries))
    }

    async fn set_application_status(
        &self,
        user_id: i64,
        job_id: &str,
        status: &str,
    ) -> Result<StatusChange, DatabaseError> {
        let mut conn = self.pool.acquire().await?;

        // Row-level update: only the matching entries are written
        let rows = sqlx::query(
            "UPDATE applications
             SET entry = jsonb_set(entry, '{status}', to_jsonb($3::text), true)
             WHERE user_id = $1 AND job_key = $2
             RETURNING position, entry",
        )
        .bind(user_id)
        .bind(job_id)
        .bind(status)
        .fetch_all(&mut *conn)
        .await?;

        let mut first: Option<(i32, AppliedJob)> = None;
        for row in rows {
            let position: i32 = row.try_get("position")?;
            let Json(entry): Json<AppliedJob> = row.try_get("entry")?;
            if first.as_ref().map(|(p, _)| position < *p).unwrap_or(true) {
                first = Some((position, entry));
            }
        }

        match first {
            Some((_, entry)) => Ok(StatusChange::Updated(entry)),
            None if user_exists(&mut conn, user_id).await? => Ok(StatusChange::EntryMissing),
            None => Ok(StatusChange::UserMissing),
        }
    }

    async fn applicants(&self, job_id: &str) -> Result<Vec<Applicant>, DatabaseError> {
        let rows = sqlx::query(
            "SELECT DISTINCT ON (u.id) u.id, u.full_name, u.phone, u.email, a.entry
             FROM applications a
             JOIN users u ON u.user_id = a.user_id
             WHERE a.job_key = $1
             ORDER BY u.id, a.position",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let Json(entry): Json<AppliedJob> = row.try_get("entry")?;
                Ok(Applicant {
                    id: row.try_get("id")?,
                    name: row.try_get("full_name")?,
                    phone: row.try_get("phone")?,
                    email: row.try_get("email")?,
                    applied_on: entry.applied_on,
                    status: entry.status,
                })
            })
            .collect()
    }
}

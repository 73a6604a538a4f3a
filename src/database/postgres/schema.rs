use sqlx::PgPool;
use tracing::info;

use crate::database::manager::DatabaseError;

/// Idempotent DDL, applied in order by [`migrate`].
///
/// `applications` holds one row per `appliedFor` entry so status writes touch
/// a single row and job lookups go through `applications_job_key_idx`.
const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL UNIQUE,
        full_name TEXT NOT NULL,
        gender TEXT,
        email TEXT NOT NULL UNIQUE,
        phone TEXT,
        location TEXT,
        birth_date DATE,
        pincode TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS applications (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL REFERENCES users (user_id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        job_key TEXT NOT NULL,
        entry JSONB NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS applications_job_key_idx ON applications (job_key)",
    "CREATE INDEX IF NOT EXISTS applications_user_idx ON applications (user_id, position)",
    r#"CREATE TABLE IF NOT EXISTS skills (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL,
        skill TEXT NOT NULL,
        level TEXT,
        rating INTEGER,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    "CREATE INDEX IF NOT EXISTS skills_user_idx ON skills (user_id)",
    r#"CREATE TABLE IF NOT EXISTS messages (
        id BIGSERIAL PRIMARY KEY,
        sender_id BIGINT NOT NULL,
        receiver_id BIGINT NOT NULL,
        text TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
    )"#,
    "CREATE INDEX IF NOT EXISTS messages_sender_idx ON messages (sender_id, created_at)",
    "CREATE INDEX IF NOT EXISTS messages_receiver_idx ON messages (receiver_id, created_at)",
    r#"CREATE TABLE IF NOT EXISTS notifications (
        id BIGSERIAL PRIMARY KEY,
        receiver_id BIGINT NOT NULL,
        message TEXT NOT NULL,
        is_read BOOLEAN NOT NULL DEFAULT false,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    "CREATE INDEX IF NOT EXISTS notifications_receiver_idx ON notifications (receiver_id, created_at)",
    r#"CREATE TABLE IF NOT EXISTS attachments (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL,
        file_name TEXT NOT NULL,
        file_path TEXT NOT NULL,
        mime_type TEXT NOT NULL,
        file_size BIGINT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS portfolios (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL UNIQUE,
        github_link TEXT,
        linked_in_link TEXT,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS preferences (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL,
        employment_type TEXT NOT NULL DEFAULT '',
        location TEXT NOT NULL DEFAULT '',
        shift TEXT NOT NULL DEFAULT '',
        workplace TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
];

pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Schema up to date ({} statements)", SCHEMA.len());
    Ok(())
}

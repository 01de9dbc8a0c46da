//! PostgreSQL pool and schema bootstrap.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Idempotent schema, applied one statement at a time.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id              BIGSERIAL PRIMARY KEY,
        username        TEXT NOT NULL,
        email           TEXT NOT NULL,
        hashed_password TEXT NOT NULL,
        is_active       BOOLEAN NOT NULL DEFAULT TRUE,
        is_superuser    BOOLEAN NOT NULL DEFAULT FALSE,
        created_at      TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT users_username_key UNIQUE (username),
        CONSTRAINT users_email_key UNIQUE (email)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS posts (
        id          BIGSERIAL PRIMARY KEY,
        title       VARCHAR(50) NOT NULL,
        content     TEXT NOT NULL,
        published   BOOLEAN NOT NULL DEFAULT TRUE,
        owner_id    BIGINT NOT NULL REFERENCES users (id),
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS posts_owner_id_idx ON posts (owner_id)",
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        id          BIGSERIAL PRIMARY KEY,
        content     TEXT NOT NULL,
        post_id     BIGINT NOT NULL REFERENCES posts (id) ON DELETE CASCADE,
        author_id   BIGINT NOT NULL REFERENCES users (id),
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS comments_post_id_idx ON comments (post_id)",
];

pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

/// Create tables and indexes if they do not exist yet.
pub async fn bootstrap_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut conn = pool.acquire().await?;
    for statement in SCHEMA {
        sqlx::query(statement).execute(&mut *conn).await?;
    }
    tracing::info!(statements = SCHEMA.len(), "database schema ready");
    Ok(())
}

/// Postgres error code of a unique violation, with the violated constraint.
pub(crate) fn unique_violation(err: &sqlx::Error) -> Option<String> {
    if let sqlx::Error::Database(db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return Some(db_err.constraint().unwrap_or_default().to_string());
        }
    }
    None
}

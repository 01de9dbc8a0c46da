//! Postgres-backed identity store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation on `users_username_key`) | `23505` | `DuplicateUsername` |
//! | Database (unique violation on `users_email_key`) | `23505` | `DuplicateEmail` |
//! | Anything else | - | `Backend` |
//!
//! Each operation acquires its own pooled connection, released when the
//! handle drops on every exit path.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use scribe_auth::{IdentityRecord, IdentityStore, NewIdentity, PasswordHash, StoreError};
use scribe_core::{Page, UserId};

use crate::db::unique_violation;

const COLUMNS: &str =
    "id, username, email, hashed_password, is_active, is_superuser, created_at";

#[derive(Clone)]
pub struct PostgresIdentityStore {
    pool: PgPool,
}

impl PostgresIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(
        &self,
        operation: &'static str,
        predicate: &str,
        value: &str,
    ) -> Result<Option<IdentityRecord>, StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;

        let sql = format!("SELECT {COLUMNS} FROM users WHERE {predicate} = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;

        Ok(row.map(IdentityRecord::from))
    }
}

#[async_trait]
impl IdentityStore for PostgresIdentityStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<IdentityRecord>, StoreError> {
        self.find_one("find_by_username", "username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<IdentityRecord>, StoreError> {
        self.find_one("find_by_email", "email", email).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<IdentityRecord>, StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;

        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.get())
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;

        Ok(row.map(IdentityRecord::from))
    }

    async fn insert(&self, identity: NewIdentity) -> Result<IdentityRecord, StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("insert_user", e))?;

        let sql = format!(
            "INSERT INTO users (username, email, hashed_password, is_active, is_superuser) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&identity.username)
            .bind(&identity.email)
            .bind(identity.password_hash.as_str())
            .bind(identity.is_active)
            .bind(identity.is_superuser)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("insert_user", e))?;

        Ok(row.into())
    }

    async fn update_password_hash(&self, id: UserId, hash: PasswordHash) -> Result<(), StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("update_password_hash", e))?;

        let result = sqlx::query("UPDATE users SET hashed_password = $1 WHERE id = $2")
            .bind(hash.as_str())
            .bind(id.get())
            .execute(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("update_password_hash", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn update_email(&self, id: UserId, email: &str) -> Result<(), StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("update_email", e))?;

        let result = sqlx::query("UPDATE users SET email = $1 WHERE id = $2")
            .bind(email)
            .bind(id.get())
            .execute(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("update_email", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list(&self, page: Page) -> Result<Vec<IdentityRecord>, StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;

        let sql = format!("SELECT {COLUMNS} FROM users ORDER BY id LIMIT $1 OFFSET $2");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(page.effective_limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;

        Ok(rows.into_iter().map(IdentityRecord::from).collect())
    }
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    if let Some(constraint) = unique_violation(&err) {
        return if constraint.contains("email") {
            StoreError::DuplicateEmail
        } else {
            StoreError::DuplicateUsername
        };
    }

    tracing::error!(operation, error = %err, "identity store query failed");
    StoreError::Backend(format!("sqlx error in {operation}: {err}"))
}

// SQLx row types

#[derive(Debug)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    hashed_password: String,
    is_active: bool,
    is_superuser: bool,
    created_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for UserRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            hashed_password: row.try_get("hashed_password")?,
            is_active: row.try_get("is_active")?,
            is_superuser: row.try_get("is_superuser")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl From<UserRow> for IdentityRecord {
    fn from(row: UserRow) -> Self {
        IdentityRecord {
            id: UserId::new(row.id),
            username: row.username,
            email: row.email,
            password_hash: PasswordHash::from_stored(row.hashed_password),
            is_active: row.is_active,
            is_superuser: row.is_superuser,
            created_at: row.created_at,
        }
    }
}

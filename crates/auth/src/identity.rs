//! Identity records and the storage seam the core reads them through.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use scribe_core::{Page, UserId};

use crate::password::PasswordHash;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: PasswordHash,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating an account; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIdentity {
    pub username: String,
    pub email: String,
    pub password_hash: PasswordHash,
    pub is_active: bool,
    pub is_superuser: bool,
}

/// Which unique field a conflicting write collided on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DuplicateField {
    Username,
    Email,
}

impl core::fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Username => f.write_str("Username"),
            Self::Email => f.write_str("Email"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("username already registered")]
    DuplicateUsername,

    #[error("email already registered")]
    DuplicateEmail,

    #[error("identity not found")]
    NotFound,

    #[error("identity store failure: {0}")]
    Backend(String),
}

/// Persistence for identity records.
///
/// `insert` and `update_email` must enforce username/email uniqueness
/// atomically; when both collide, the username is reported.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Exact, case-sensitive lookup.
    async fn find_by_username(&self, username: &str) -> Result<Option<IdentityRecord>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<IdentityRecord>, StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<IdentityRecord>, StoreError>;

    async fn insert(&self, identity: NewIdentity) -> Result<IdentityRecord, StoreError>;

    async fn update_password_hash(&self, id: UserId, hash: PasswordHash) -> Result<(), StoreError>;

    async fn update_email(&self, id: UserId, email: &str) -> Result<(), StoreError>;

    /// Records ordered by id.
    async fn list(&self, page: Page) -> Result<Vec<IdentityRecord>, StoreError>;
}

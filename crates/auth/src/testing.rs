//! Minimal identity store for unit tests in this crate.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use scribe_core::{Page, UserId};

use crate::identity::{IdentityRecord, IdentityStore, NewIdentity, StoreError};
use crate::password::PasswordHash;

#[derive(Default)]
pub(crate) struct VecStore {
    records: Mutex<Vec<IdentityRecord>>,
    pub(crate) fail_lookups: bool,
}

impl VecStore {
    pub(crate) fn failing() -> Self {
        Self {
            fail_lookups: true,
            ..Self::default()
        }
    }

    pub(crate) fn set_active(&self, username: &str, active: bool) {
        let mut records = self.records.lock().unwrap();
        if let Some(r) = records.iter_mut().find(|r| r.username == username) {
            r.is_active = active;
        }
    }
}

#[async_trait]
impl IdentityStore for VecStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<IdentityRecord>, StoreError> {
        if self.fail_lookups {
            return Err(StoreError::Backend("connection refused".into()));
        }
        let records = self.records.lock().unwrap();
        Ok(records.iter().find(|r| r.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<IdentityRecord>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().find(|r| r.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<IdentityRecord>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn insert(&self, identity: NewIdentity) -> Result<IdentityRecord, StoreError> {
        let mut records = self.records.lock().unwrap();
        if records.iter().any(|r| r.username == identity.username) {
            return Err(StoreError::DuplicateUsername);
        }
        if records.iter().any(|r| r.email == identity.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let record = IdentityRecord {
            id: UserId::new(records.len() as i64 + 1),
            username: identity.username,
            email: identity.email,
            password_hash: identity.password_hash,
            is_active: identity.is_active,
            is_superuser: identity.is_superuser,
            created_at: Utc::now(),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn update_password_hash(&self, id: UserId, hash: PasswordHash) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let record = records.iter_mut().find(|r| r.id == id).ok_or(StoreError::NotFound)?;
        record.password_hash = hash;
        Ok(())
    }

    async fn update_email(&self, id: UserId, email: &str) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        if records.iter().any(|r| r.email == email && r.id != id) {
            return Err(StoreError::DuplicateEmail);
        }
        let record = records.iter_mut().find(|r| r.id == id).ok_or(StoreError::NotFound)?;
        record.email = email.to_string();
        Ok(())
    }

    async fn list(&self, page: Page) -> Result<Vec<IdentityRecord>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .skip(page.offset())
            .take(page.effective_limit())
            .cloned()
            .collect())
    }
}

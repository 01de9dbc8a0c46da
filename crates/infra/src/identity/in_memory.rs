use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use scribe_auth::{IdentityRecord, IdentityStore, NewIdentity, PasswordHash, StoreError};
use scribe_core::{Page, UserId};

#[derive(Debug, Default)]
struct Inner {
    records: BTreeMap<UserId, IdentityRecord>,
    last_id: i64,
}

/// In-memory identity store for tests/dev.
///
/// Uniqueness checks and the insert happen under one write lock.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    inner: RwLock<Inner>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("identity store lock poisoned".into())
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<IdentityRecord>, StoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.records.values().find(|r| r.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<IdentityRecord>, StoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.records.values().find(|r| r.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<IdentityRecord>, StoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.records.get(&id).cloned())
    }

    async fn insert(&self, identity: NewIdentity) -> Result<IdentityRecord, StoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;

        if inner.records.values().any(|r| r.username == identity.username) {
            return Err(StoreError::DuplicateUsername);
        }
        if inner.records.values().any(|r| r.email == identity.email) {
            return Err(StoreError::DuplicateEmail);
        }

        inner.last_id += 1;
        let record = IdentityRecord {
            id: UserId::new(inner.last_id),
            username: identity.username,
            email: identity.email,
            password_hash: identity.password_hash,
            is_active: identity.is_active,
            is_superuser: identity.is_superuser,
            created_at: Utc::now(),
        };
        inner.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_password_hash(&self, id: UserId, hash: PasswordHash) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let record = inner.records.get_mut(&id).ok_or(StoreError::NotFound)?;
        record.password_hash = hash;
        Ok(())
    }

    async fn update_email(&self, id: UserId, email: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;

        if inner.records.values().any(|r| r.email == email && r.id != id) {
            return Err(StoreError::DuplicateEmail);
        }
        let record = inner.records.get_mut(&id).ok_or(StoreError::NotFound)?;
        record.email = email.to_string();
        Ok(())
    }

    async fn list(&self, page: Page) -> Result<Vec<IdentityRecord>, StoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner
            .records
            .values()
            .skip(page.offset())
            .take(page.effective_limit())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_identity(username: &str, email: &str) -> NewIdentity {
        NewIdentity {
            username: username.into(),
            email: email.into(),
            password_hash: PasswordHash::from_stored("$2b$04$placeholder"),
            is_active: true,
            is_superuser: false,
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = InMemoryIdentityStore::new();
        let a = store.insert(new_identity("alice", "alice@example.com")).await.unwrap();
        let b = store.insert(new_identity("bob", "bob@example.com")).await.unwrap();
        assert_eq!(a.id, UserId::new(1));
        assert_eq!(b.id, UserId::new(2));
        assert_eq!(store.find_by_username("bob").await.unwrap(), Some(b));
    }

    #[tokio::test]
    async fn username_collision_wins_over_email_collision() {
        let store = InMemoryIdentityStore::new();
        store.insert(new_identity("alice", "alice@example.com")).await.unwrap();

        assert_eq!(
            store.insert(new_identity("alice", "alice@example.com")).await,
            Err(StoreError::DuplicateUsername)
        );
        assert_eq!(
            store.insert(new_identity("alice2", "alice@example.com")).await,
            Err(StoreError::DuplicateEmail)
        );
    }

    #[tokio::test]
    async fn update_email_rejects_taken_address() {
        let store = InMemoryIdentityStore::new();
        let alice = store.insert(new_identity("alice", "alice@example.com")).await.unwrap();
        store.insert(new_identity("bob", "bob@example.com")).await.unwrap();

        assert_eq!(
            store.update_email(alice.id, "bob@example.com").await,
            Err(StoreError::DuplicateEmail)
        );
        store.update_email(alice.id, "alice@example.org").await.unwrap();
        assert!(store.find_by_email("alice@example.org").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn updates_to_unknown_ids_are_not_found() {
        let store = InMemoryIdentityStore::new();
        assert_eq!(
            store
                .update_password_hash(UserId::new(9), PasswordHash::from_stored("x"))
                .await,
            Err(StoreError::NotFound)
        );
    }

    #[tokio::test]
    async fn concurrent_inserts_of_one_username_admit_exactly_one() {
        let store = std::sync::Arc::new(InMemoryIdentityStore::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .insert(new_identity("alice", &format!("alice{i}@example.com")))
                    .await
            }));
        }

        let mut ok = 0;
        for h in handles {
            if h.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
    }

    #[tokio::test]
    async fn list_pages_in_id_order() {
        let store = InMemoryIdentityStore::new();
        for name in ["a", "b", "c"] {
            store
                .insert(new_identity(name, &format!("{name}@example.com")))
                .await
                .unwrap();
        }

        let page = store.list(Page::new(2, 1)).await.unwrap();
        let names: Vec<_> = page.iter().map(|r| r.username.as_str()).collect();
        assert_eq!(names, ["b", "c"]);
    }
}

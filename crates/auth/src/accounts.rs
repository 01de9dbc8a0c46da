//! Account lifecycle: self-registration, admin creation, and the caller's own
//! profile/password/email.

use std::sync::Arc;

use serde::Deserialize;

use scribe_core::Page;

use crate::authorize::{authorize_account_creation, require_superuser};
use crate::error::{AuthError, AuthResult};
use crate::identity::{DuplicateField, IdentityRecord, IdentityStore, NewIdentity};
use crate::password::{MAX_PASSWORD_BYTES, PasswordHasher};
use crate::principal::Principal;

pub const MAX_USERNAME_LEN: usize = 50;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MIN_NEW_PASSWORD_LEN: usize = 6;

/// Account creation payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_superuser: bool,
}

pub struct AccountService {
    store: Arc<dyn IdentityStore>,
    hasher: PasswordHasher,
}

impl AccountService {
    pub fn new(store: Arc<dyn IdentityStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    /// Self-service sign-up. Always produces an ordinary, active account.
    pub async fn register(&self, account: NewAccount) -> AuthResult<IdentityRecord> {
        self.create(account, false).await
    }

    /// Create an account on behalf of `requester`.
    ///
    /// The elevation rule is checked before the superuser requirement so a
    /// non-superuser asking for a superuser account is told exactly that.
    pub async fn create_by_admin(
        &self,
        requester: &Principal,
        account: NewAccount,
    ) -> AuthResult<IdentityRecord> {
        let requested_superuser = account.is_superuser;
        if let Err(e) = authorize_account_creation(requester, requested_superuser)
            .and_then(|_| require_superuser(requester.clone()).map(|_| ()))
        {
            tracing::warn!(
                requester = %requester.id,
                requested_superuser,
                error = %e,
                "account creation refused"
            );
            return Err(e.into());
        }

        self.create(account, requested_superuser).await
    }

    /// Create the bootstrap superuser unless it already exists.
    ///
    /// Returns `Ok(None)` when the username already belongs to a superuser.
    /// A username held by an ordinary account is a duplicate: the bootstrap
    /// admin would otherwise silently never exist.
    pub async fn ensure_superuser(&self, account: NewAccount) -> AuthResult<Option<IdentityRecord>> {
        match self.store.find_by_username(&account.username).await? {
            Some(existing) if existing.is_superuser => Ok(None),
            Some(existing) => {
                tracing::warn!(
                    user_id = %existing.id,
                    username = %existing.username,
                    "bootstrap superuser name is taken by an ordinary account"
                );
                Err(AuthError::DuplicateIdentity(DuplicateField::Username))
            }
            None => self.create(account, true).await.map(Some),
        }
    }

    async fn create(&self, account: NewAccount, is_superuser: bool) -> AuthResult<IdentityRecord> {
        validate_username(&account.username)?;
        validate_email(&account.email)?;
        if account.password.is_empty() {
            return Err(AuthError::validation("password must not be empty"));
        }
        check_password_fits(&account.password)?;

        // The store enforces uniqueness atomically; these checks only fix the
        // reporting order for the common case.
        if self.store.find_by_username(&account.username).await?.is_some() {
            return Err(AuthError::DuplicateIdentity(DuplicateField::Username));
        }
        if self.store.find_by_email(&account.email).await?.is_some() {
            return Err(AuthError::DuplicateIdentity(DuplicateField::Email));
        }

        let password_hash = self.hasher.hash_offloaded(account.password).await?;
        let record = self
            .store
            .insert(NewIdentity {
                username: account.username,
                email: account.email,
                password_hash,
                is_active: true,
                is_superuser,
            })
            .await?;

        tracing::info!(user_id = %record.id, is_superuser, "account created");
        Ok(record)
    }

    pub async fn profile(&self, principal: &Principal) -> AuthResult<IdentityRecord> {
        self.store
            .find_by_id(principal.id)
            .await?
            .ok_or(AuthError::NotFound)
    }

    /// Replace the caller's password after re-checking the current one.
    pub async fn change_password(
        &self,
        principal: &Principal,
        current: String,
        new_password: String,
    ) -> AuthResult<()> {
        if new_password.chars().count() < MIN_NEW_PASSWORD_LEN {
            return Err(AuthError::validation(format!(
                "new password must be at least {MIN_NEW_PASSWORD_LEN} characters"
            )));
        }
        check_password_fits(&new_password)?;

        let record = self.profile(principal).await?;
        if !self
            .hasher
            .verify_offloaded(current, record.password_hash.clone())
            .await
        {
            tracing::info!(user_id = %record.id, "password change refused: current password mismatch");
            return Err(AuthError::PasswordMismatch);
        }

        let hash = self.hasher.hash_offloaded(new_password).await?;
        self.store.update_password_hash(record.id, hash).await?;
        tracing::info!(user_id = %record.id, "password changed");
        Ok(())
    }

    pub async fn change_email(&self, principal: &Principal, email: &str) -> AuthResult<()> {
        validate_email(email)?;

        if let Some(existing) = self.store.find_by_email(email).await? {
            if existing.id != principal.id {
                return Err(AuthError::DuplicateIdentity(DuplicateField::Email));
            }
            return Ok(());
        }

        self.store.update_email(principal.id, email).await?;
        tracing::info!(user_id = %principal.id, "email changed");
        Ok(())
    }

    pub async fn list_accounts(
        &self,
        requester: &Principal,
        page: Page,
    ) -> AuthResult<Vec<IdentityRecord>> {
        require_superuser(requester.clone())?;
        Ok(self.store.list(page).await?)
    }
}

fn check_password_fits(password: &str) -> AuthResult<()> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::validation(format!(
            "password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> AuthResult<()> {
    let len = username.chars().count();
    if len == 0 || len > MAX_USERNAME_LEN {
        return Err(AuthError::validation(format!(
            "username must be 1 to {MAX_USERNAME_LEN} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(AuthError::validation(
            "username may only contain letters, digits, '_', '.' and '-'",
        ));
    }
    Ok(())
}

/// Shape check only: `local@domain.tld`, no whitespace.
pub fn validate_email(email: &str) -> AuthResult<()> {
    let invalid = || AuthError::validation("email address is not valid");

    if email.is_empty() || email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authorize::AuthzError;
    use crate::testing::VecStore;
    use scribe_core::UserId;

    fn service() -> AccountService {
        AccountService::new(
            Arc::new(VecStore::default()),
            PasswordHasher::new(PasswordHasher::MIN_COST).unwrap(),
        )
    }

    fn account(username: &str, email: &str, is_superuser: bool) -> NewAccount {
        NewAccount {
            username: username.into(),
            email: email.into(),
            password: "s3cret".into(),
            is_superuser,
        }
    }

    fn principal_of(record: &IdentityRecord) -> Principal {
        Principal {
            username: record.username.clone(),
            id: record.id,
            is_superuser: record.is_superuser,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Registration
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn register_never_grants_superuser() {
        let svc = service();
        let record = svc
            .register(account("alice", "alice@example.com", true))
            .await
            .unwrap();

        assert!(!record.is_superuser);
        assert!(record.is_active);
        assert_ne!(record.password_hash.as_str(), "s3cret");
    }

    #[tokio::test]
    async fn duplicate_username_is_reported_before_email() {
        let svc = service();
        svc.register(account("alice", "alice@example.com", false)).await.unwrap();

        let err = svc
            .register(account("alice", "alice@example.com", false))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::DuplicateIdentity(DuplicateField::Username));
        assert_eq!(err.to_string(), "Username already registered");

        let err = svc
            .register(account("alice2", "alice@example.com", false))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Email already registered");
    }

    #[tokio::test]
    async fn register_validates_fields() {
        let svc = service();
        for (username, email) in [
            ("", "a@example.com"),
            ("has space", "a@example.com"),
            ("ok", "no-at-sign"),
            ("ok", "a@nodot"),
            ("ok", "a@@example.com"),
        ] {
            let err = svc.register(account(username, email, false)).await.unwrap_err();
            assert!(matches!(err, AuthError::Validation(_)), "{username:?}/{email:?}: {err:?}");
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Admin creation
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn superuser_creates_superuser() {
        let svc = service();
        let admin = svc
            .ensure_superuser(account("admin", "admin@example.com", true))
            .await
            .unwrap()
            .unwrap();

        let bob = svc
            .create_by_admin(&principal_of(&admin), account("bob", "bob@example.com", true))
            .await
            .unwrap();
        assert!(bob.is_superuser);
    }

    #[tokio::test]
    async fn bootstrap_superuser_is_idempotent() {
        let svc = service();
        assert!(svc
            .ensure_superuser(account("admin", "admin@example.com", true))
            .await
            .unwrap()
            .is_some());
        assert_eq!(
            svc.ensure_superuser(account("admin", "admin@example.com", true))
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn bootstrap_superuser_refuses_a_name_held_by_an_ordinary_account() {
        let svc = service();
        svc.register(account("admin", "admin@example.com", false)).await.unwrap();

        let err = svc
            .ensure_superuser(account("admin", "root@example.com", true))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::DuplicateIdentity(DuplicateField::Username));
    }

    #[tokio::test]
    async fn over_long_passwords_are_rejected_before_hashing() {
        let svc = service();
        let mut long = account("alice", "alice@example.com", false);
        long.password = "a".repeat(MAX_PASSWORD_BYTES + 1);
        let err = svc.register(long).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)), "{err:?}");

        let alice = svc.register(account("alice", "alice@example.com", false)).await.unwrap();
        let err = svc
            .change_password(&principal_of(&alice), "s3cret".into(), "b".repeat(100))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)), "{err:?}");
    }

    #[tokio::test]
    async fn non_superuser_asking_for_superuser_gets_elevation_refusal() {
        let svc = service();
        let alice = svc.register(account("alice", "alice@example.com", false)).await.unwrap();

        let err = svc
            .create_by_admin(&principal_of(&alice), account("eve", "eve@example.com", true))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InsufficientPrivilege(AuthzError::AdminCreationDenied));
        assert_eq!(err.to_string(), "Only admins can create admin users.");
    }

    #[tokio::test]
    async fn non_superuser_cannot_create_ordinary_accounts_either() {
        let svc = service();
        let alice = svc.register(account("alice", "alice@example.com", false)).await.unwrap();

        let err = svc
            .create_by_admin(&principal_of(&alice), account("eve", "eve@example.com", false))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InsufficientPrivilege(AuthzError::SuperuserRequired));
    }

    #[tokio::test]
    async fn ensure_superuser_is_idempotent() {
        let svc = service();
        let first = svc
            .ensure_superuser(account("admin", "admin@example.com", true))
            .await
            .unwrap();
        let second = svc
            .ensure_superuser(account("admin", "admin@example.com", true))
            .await
            .unwrap();
        assert!(first.is_some());
        assert!(second.is_none());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Self-service
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn change_password_requires_current_password() {
        let svc = service();
        let alice = svc.register(account("alice", "alice@example.com", false)).await.unwrap();
        let me = principal_of(&alice);

        let err = svc
            .change_password(&me, "wrong".into(), "n3w-pass".into())
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::PasswordMismatch);

        svc.change_password(&me, "s3cret".into(), "n3w-pass".into())
            .await
            .unwrap();
        let record = svc.profile(&me).await.unwrap();
        let hasher = PasswordHasher::new(PasswordHasher::MIN_COST).unwrap();
        assert!(hasher.verify("n3w-pass", &record.password_hash));
    }

    #[tokio::test]
    async fn short_new_password_is_rejected() {
        let svc = service();
        let alice = svc.register(account("alice", "alice@example.com", false)).await.unwrap();

        let err = svc
            .change_password(&principal_of(&alice), "s3cret".into(), "12345".into())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn change_email_rejects_addresses_in_use() {
        let svc = service();
        let alice = svc.register(account("alice", "alice@example.com", false)).await.unwrap();
        svc.register(account("bob", "bob@example.com", false)).await.unwrap();
        let me = principal_of(&alice);

        let err = svc.change_email(&me, "bob@example.com").await.unwrap_err();
        assert_eq!(err, AuthError::DuplicateIdentity(DuplicateField::Email));

        svc.change_email(&me, "alice@example.org").await.unwrap();
        assert_eq!(svc.profile(&me).await.unwrap().email, "alice@example.org");
    }

    #[tokio::test]
    async fn listing_accounts_is_superuser_only() {
        let svc = service();
        let alice = svc.register(account("alice", "alice@example.com", false)).await.unwrap();

        let err = svc
            .list_accounts(&principal_of(&alice), Page::default())
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InsufficientPrivilege(AuthzError::SuperuserRequired));

        let root = Principal {
            username: "root".into(),
            id: UserId::new(99),
            is_superuser: true,
        };
        assert_eq!(svc.list_accounts(&root, Page::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn profile_of_unknown_id_is_not_found() {
        let svc = service();
        let ghost = Principal {
            username: "ghost".into(),
            id: UserId::new(404),
            is_superuser: false,
        };
        assert_eq!(svc.profile(&ghost).await, Err(AuthError::NotFound));
    }
}

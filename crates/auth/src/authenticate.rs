//! Username/password verification against the identity store.

use std::sync::Arc;

use crate::error::AuthError;
use crate::identity::IdentityStore;
use crate::password::{HashError, PasswordHash, PasswordHasher};
use crate::principal::VerifiedIdentity;

/// Compared against when the username is unknown so that path costs a full
/// bcrypt verification too.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-users";

pub struct Authenticator {
    store: Arc<dyn IdentityStore>,
    hasher: PasswordHasher,
    decoy: PasswordHash,
}

impl Authenticator {
    pub fn new(store: Arc<dyn IdentityStore>, hasher: PasswordHasher) -> Result<Self, HashError> {
        let decoy = hasher.hash(DECOY_PASSWORD)?;
        Ok(Self {
            store,
            hasher,
            decoy,
        })
    }

    /// Check `username`/`password`.
    ///
    /// Every failure is [`AuthError::InvalidCredentials`]: unknown user,
    /// wrong password, disabled account, and a failed store lookup alike.
    /// The lookup is attempted once.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<VerifiedIdentity, AuthError> {
        let record = match self.store.find_by_username(username).await {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(error = %e, "identity lookup failed during authentication");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let Some(record) = record else {
            let _ = self
                .hasher
                .verify_offloaded(password.to_owned(), self.decoy.clone())
                .await;
            tracing::info!(username, outcome = "unknown_user", "authentication failed");
            return Err(AuthError::InvalidCredentials);
        };

        let matched = self
            .hasher
            .verify_offloaded(password.to_owned(), record.password_hash.clone())
            .await;
        if !matched {
            tracing::info!(username, user_id = %record.id, outcome = "bad_password", "authentication failed");
            return Err(AuthError::InvalidCredentials);
        }

        if !record.is_active {
            tracing::info!(username, user_id = %record.id, outcome = "inactive", "authentication failed");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(username, user_id = %record.id, "authentication succeeded");
        Ok(VerifiedIdentity::from(&record))
    }
}

//! Salted, work-factor-tunable password hashing (bcrypt).

use thiserror::Error;

/// Longest accepted password, in bytes.
///
/// bcrypt keys on at most 72 bytes including its NUL terminator; anything
/// longer is refused instead of silently truncated.
pub const MAX_PASSWORD_BYTES: usize = 71;

/// A stored bcrypt digest (`$2b$<cost>$<salt+hash>`).
///
/// Opaque to the rest of the system; only [`PasswordHasher::verify`] looks inside.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a digest previously produced by [`PasswordHasher::hash`] and read
    /// back from storage.
    pub fn from_stored(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("bcrypt cost {0} is outside 4..=31")]
    InvalidCost(u32),

    #[error("password is longer than bcrypt can key on")]
    TooLong,

    #[error("password hashing failed: {0}")]
    Backend(String),

    #[error("password hashing task did not complete: {0}")]
    Join(String),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub const MIN_COST: u32 = 4;
    pub const MAX_COST: u32 = 31;

    pub fn new(cost: u32) -> Result<Self, HashError> {
        if !(Self::MIN_COST..=Self::MAX_COST).contains(&cost) {
            return Err(HashError::InvalidCost(cost));
        }
        Ok(Self { cost })
    }

    /// Hash `plaintext` with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<PasswordHash, HashError> {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(HashError::TooLong);
        }
        bcrypt::non_truncating_hash(plaintext, self.cost)
            .map(PasswordHash)
            .map_err(|e| match e {
                bcrypt::BcryptError::Truncation(_) => HashError::TooLong,
                other => HashError::Backend(other.to_string()),
            })
    }

    /// Check `plaintext` against `hash`.
    ///
    /// A malformed digest or an over-long password is a mismatch.
    pub fn verify(&self, plaintext: &str, hash: &PasswordHash) -> bool {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        bcrypt::non_truncating_verify(plaintext, hash.as_str()).unwrap_or(false)
    }

    /// [`hash`](Self::hash) on the blocking pool.
    pub async fn hash_offloaded(&self, plaintext: String) -> Result<PasswordHash, HashError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| HashError::Join(e.to_string()))?
    }

    /// [`verify`](Self::verify) on the blocking pool.
    ///
    /// A task that fails to complete counts as a mismatch.
    pub async fn verify_offloaded(&self, plaintext: String, hash: PasswordHash) -> bool {
        let hasher = *self;
        match tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &hash)).await {
            Ok(matched) => matched,
            Err(e) => {
                tracing::error!(error = %e, "password verification task failed");
                false
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: crate::config::DEFAULT_BCRYPT_COST,
        }
    }
}

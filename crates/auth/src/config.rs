//! Authentication configuration.
//!
//! Loaded once at startup and never mutated afterwards. A configuration that
//! fails [`AuthConfig::validate`] must stop the process before it serves.

use chrono::Duration;
use thiserror::Error;

use crate::password::PasswordHasher;

/// Default lifetime of an issued access token.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 20;

/// Longest accepted token lifetime.
pub const MAX_TOKEN_TTL_DAYS: i64 = 365;

/// bcrypt work factor used unless configured otherwise.
pub const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

/// Minimum accepted length of the signing secret.
pub const MIN_SECRET_LEN: usize = 32;

/// Placeholder secrets that must never sign production tokens.
const INSECURE_SECRETS: &[&str] = &[
    "dev-secret",
    "secret",
    "changeme",
    "dev-secret-change-in-production",
];

#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret, or `env:VAR_NAME` to read it from the environment.
    pub jwt_secret: String,

    /// Lifetime of issued tokens.
    pub token_ttl: Duration,

    /// bcrypt work factor.
    pub bcrypt_cost: u32,
}

impl core::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl: Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Resolve the signing secret, expanding `env:VAR_NAME` syntax.
    pub fn resolve_jwt_secret(&self) -> Result<String, ConfigError> {
        match self.jwt_secret.strip_prefix("env:") {
            Some(var_name) => match std::env::var(var_name) {
                Ok(secret) if !secret.is_empty() => Ok(secret),
                Ok(_) => Err(ConfigError::EnvVarEmpty(var_name.to_string())),
                Err(_) => Err(ConfigError::EnvVarNotFound(var_name.to_string())),
            },
            None => Ok(self.jwt_secret.clone()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let secret = self.resolve_jwt_secret()?;
        if secret.trim().is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }
        if INSECURE_SECRETS.contains(&secret.as_str()) {
            return Err(ConfigError::InsecureJwtSecret);
        }
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::JwtSecretTooShort { min: MIN_SECRET_LEN });
        }

        check_token_ttl(self.token_ttl)?;

        if !(PasswordHasher::MIN_COST..=PasswordHasher::MAX_COST).contains(&self.bcrypt_cost) {
            return Err(ConfigError::BcryptCostOutOfRange(self.bcrypt_cost));
        }

        Ok(())
    }
}

/// Token lifetime must lie in `1s..=MAX_TOKEN_TTL_DAYS`.
pub fn check_token_ttl(ttl: Duration) -> Result<(), ConfigError> {
    if ttl < Duration::seconds(1) {
        return Err(ConfigError::NonPositiveTtl);
    }
    if ttl > Duration::days(MAX_TOKEN_TTL_DAYS) {
        return Err(ConfigError::TtlTooLong {
            max_days: MAX_TOKEN_TTL_DAYS,
        });
    }
    Ok(())
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT secret is required")]
    MissingJwtSecret,

    #[error("JWT secret is a known placeholder value; configure a real secret")]
    InsecureJwtSecret,

    #[error("JWT secret must be at least {min} characters long")]
    JwtSecretTooShort { min: usize },

    #[error("environment variable '{0}' not found (referenced via env:{0})")]
    EnvVarNotFound(String),

    #[error("environment variable '{0}' is empty (referenced via env:{0})")]
    EnvVarEmpty(String),

    #[error("token TTL must be at least one second")]
    NonPositiveTtl,

    #[error("token TTL must not exceed {max_days} days")]
    TtlTooLong { max_days: i64 },

    #[error("bcrypt cost {0} is outside 4..=31")]
    BcryptCostOutOfRange(u32),
}

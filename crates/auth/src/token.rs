//! Bearer token codec: HS256-signed JWTs carrying a [`ClaimSet`].

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Deserialize;
use thiserror::Error;

use scribe_core::UserId;

use crate::claims::{ClaimSet, validate_claims};
use crate::config::{AuthConfig, ConfigError};

/// The only accepted signing algorithm.
pub const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token signature does not verify")]
    BadSignature,

    #[error("token is not signed with HS256")]
    AlgorithmMismatch,

    #[error("token is missing the '{0}' claim")]
    MissingClaim(&'static str),

    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("token could not be signed: {0}")]
    Signing(String),
}

impl TokenError {
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }
}

/// Validate a bearer token and return its claims.
///
/// Implementations must verify the signature before trusting any field.
pub trait TokenValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<ClaimSet, TokenError>;
}

/// Payload as it appears on the wire, before presence checks.
#[derive(Deserialize)]
struct WireClaims {
    sub: Option<String>,
    id: Option<i64>,
    is_superuser: Option<bool>,
    exp: Option<i64>,
}

impl WireClaims {
    fn into_claim_set(self) -> Result<ClaimSet, TokenError> {
        Ok(ClaimSet {
            sub: self.sub.ok_or(TokenError::MissingClaim("sub"))?,
            id: UserId::new(self.id.ok_or(TokenError::MissingClaim("id"))?),
            is_superuser: self.is_superuser.unwrap_or(false),
            exp: self.exp.ok_or(TokenError::MissingClaim("exp"))?,
        })
    }
}

/// HS256 encoder/decoder holding the process-wide signing key.
///
/// Built once at startup and shared behind an `Arc`.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl core::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked by `validate_claims` with an exclusive bound and no leeway.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::new();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Validate `config` and build a codec from its resolved secret.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let secret = config.resolve_jwt_secret()?;
        Ok(Self::new(secret.as_bytes()))
    }

    pub fn encode(&self, claims: &ClaimSet) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(ALGORITHM), claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<ClaimSet, TokenError> {
        let header = jsonwebtoken::decode_header(token).map_err(map_jwt_error)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::AlgorithmMismatch);
        }

        let data = jsonwebtoken::decode::<WireClaims>(token, &self.decoding, &self.validation)
            .map_err(map_jwt_error)?;

        let claims = data.claims.into_claim_set()?;
        validate_claims(&claims, now)?;
        Ok(claims)
    }
}

impl TokenValidator for TokenCodec {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<ClaimSet, TokenError> {
        self.decode(token, now)
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature => TokenError::BadSignature,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            TokenError::AlgorithmMismatch
        }
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed(err.to_string()),
    }
}

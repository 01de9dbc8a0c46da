use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use scribe_core::UserId;

use crate::token::TokenError;

/// Signed token payload.
///
/// A snapshot taken at issuance: privilege changes made afterwards are not
/// visible until the holder obtains a new token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    /// Username of the subject.
    pub sub: String,

    /// Storage id of the subject.
    pub id: UserId,

    /// Superuser flag at issuance.
    pub is_superuser: bool,

    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

/// Deterministically validate decoded claims against `now`.
///
/// Signature verification happens in [`crate::token::TokenCodec`]; this only
/// checks what the payload itself says.
pub fn validate_claims(claims: &ClaimSet, now: DateTime<Utc>) -> Result<(), TokenError> {
    if claims.sub.is_empty() {
        return Err(TokenError::MissingClaim("sub"));
    }
    if now.timestamp() >= claims.exp {
        return Err(TokenError::Expired);
    }
    Ok(())
}

use serde::Serialize;

use scribe_core::UserId;

use crate::claims::ClaimSet;
use crate::identity::IdentityRecord;

/// Caller identity established from a verified token.
///
/// Carries exactly what the token asserted; downstream code uses `id` for
/// ownership checks and `is_superuser` for the administrative guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub username: String,
    pub id: UserId,
    pub is_superuser: bool,
}

impl From<ClaimSet> for Principal {
    fn from(claims: ClaimSet) -> Self {
        Self {
            username: claims.sub,
            id: claims.id,
            is_superuser: claims.is_superuser,
        }
    }
}

/// Result of a successful credential check. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub id: UserId,
    pub username: String,
    pub is_superuser: bool,
}

impl From<&IdentityRecord> for VerifiedIdentity {
    fn from(record: &IdentityRecord) -> Self {
        Self {
            id: record.id,
            username: record.username.clone(),
            is_superuser: record.is_superuser,
        }
    }
}

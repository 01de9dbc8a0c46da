//! Turn an `Authorization` header into a [`Principal`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::principal::Principal;
use crate::token::{TokenError, TokenValidator};

/// Why a request was refused. Only for telemetry; callers see [`Unauthorized`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    MissingToken,
    NotBearer,
    EmptyToken,
    Token(TokenError),
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::NotBearer => "not_bearer",
            Self::EmptyToken => "empty_token",
            Self::Token(TokenError::Expired) => "expired",
            Self::Token(TokenError::BadSignature) => "bad_signature",
            Self::Token(TokenError::AlgorithmMismatch) => "algorithm_mismatch",
            Self::Token(TokenError::MissingClaim(_)) => "missing_claim",
            Self::Token(TokenError::Malformed(_)) => "malformed",
            Self::Token(TokenError::Signing(_)) => "signing",
        }
    }
}

/// Single outward failure kind for every token problem.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Could not validate credentials")]
pub struct Unauthorized {
    reason: RejectReason,
}

impl Unauthorized {
    pub fn reason(&self) -> &RejectReason {
        &self.reason
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.reason, RejectReason::Token(TokenError::Expired))
    }
}

impl From<RejectReason> for Unauthorized {
    fn from(reason: RejectReason) -> Self {
        Self { reason }
    }
}

/// Extract the token from a `Bearer <token>` header value.
///
/// The scheme is matched case-insensitively.
pub fn extract_bearer(header: &str) -> Result<&str, RejectReason> {
    let (scheme, token) = header.trim().split_once(' ').ok_or_else(|| {
        if header.trim().eq_ignore_ascii_case("bearer") {
            RejectReason::EmptyToken
        } else {
            RejectReason::NotBearer
        }
    })?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(RejectReason::NotBearer);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(RejectReason::EmptyToken);
    }
    Ok(token)
}

/// Stateless: never touches storage, only the token validator.
#[derive(Clone)]
pub struct IdentityResolver {
    validator: Arc<dyn TokenValidator>,
}

impl IdentityResolver {
    pub fn new(validator: Arc<dyn TokenValidator>) -> Self {
        Self { validator }
    }

    pub fn resolve(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Principal, Unauthorized> {
        let header = authorization.ok_or(RejectReason::MissingToken)?;
        let token = extract_bearer(header)?;

        let claims = self
            .validator
            .validate(token, now)
            .map_err(RejectReason::Token)?;

        Ok(Principal::from(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::ClaimSet;
    use crate::token::TokenCodec;
    use chrono::Duration;
    use scribe_core::UserId;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn setup() -> (Arc<TokenCodec>, IdentityResolver) {
        let codec = Arc::new(TokenCodec::new(SECRET));
        let resolver = IdentityResolver::new(codec.clone());
        (codec, resolver)
    }

    fn token(codec: &TokenCodec, exp: DateTime<Utc>) -> String {
        codec
            .encode(&ClaimSet {
                sub: "alice".into(),
                id: UserId::new(5),
                is_superuser: false,
                exp: exp.timestamp(),
            })
            .unwrap()
    }

    #[test]
    fn resolves_principal_from_valid_bearer() {
        let (codec, resolver) = setup();
        let now = Utc::now();
        let header = format!("Bearer {}", token(&codec, now + Duration::minutes(1)));

        let principal = resolver.resolve(Some(&header), now).unwrap();
        assert_eq!(
            principal,
            Principal {
                username: "alice".into(),
                id: UserId::new(5),
                is_superuser: false,
            }
        );
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let (codec, resolver) = setup();
        let now = Utc::now();
        let header = format!("bearer {}", token(&codec, now + Duration::minutes(1)));
        assert!(resolver.resolve(Some(&header), now).is_ok());
    }

    #[test]
    fn missing_or_non_bearer_headers_are_unauthorized() {
        let (_, resolver) = setup();
        let now = Utc::now();

        let err = resolver.resolve(None, now).unwrap_err();
        assert_eq!(err.reason(), &RejectReason::MissingToken);

        let err = resolver.resolve(Some("Basic YWxpY2U6cHc="), now).unwrap_err();
        assert_eq!(err.reason(), &RejectReason::NotBearer);

        let err = resolver.resolve(Some("Bearer   "), now).unwrap_err();
        assert_eq!(err.reason(), &RejectReason::EmptyToken);

        let err = resolver.resolve(Some("Bearer"), now).unwrap_err();
        assert_eq!(err.reason(), &RejectReason::EmptyToken);
    }

    #[test]
    fn every_token_failure_is_the_same_outward_kind() {
        let (codec, resolver) = setup();
        let now = Utc::now();
        let expired = format!("Bearer {}", token(&codec, now - Duration::seconds(1)));
        let garbage = "Bearer not.a.jwt".to_string();

        let e1 = resolver.resolve(Some(&expired), now).unwrap_err();
        let e2 = resolver.resolve(Some(&garbage), now).unwrap_err();

        assert_eq!(e1.to_string(), e2.to_string());
        assert!(e1.is_expired());
        assert!(!e2.is_expired());
        assert_eq!(e1.reason().as_str(), "expired");
    }
}

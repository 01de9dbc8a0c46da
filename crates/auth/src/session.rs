//! Mint access tokens for verified identities.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::claims::ClaimSet;
use crate::config::{ConfigError, check_token_ttl};
use crate::principal::VerifiedIdentity;
use crate::token::{TokenCodec, TokenError};

pub const TOKEN_TYPE: &str = "bearer";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    #[serde(skip)]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SessionIssuer {
    codec: Arc<TokenCodec>,
    ttl: Duration,
}

impl SessionIssuer {
    pub fn new(codec: Arc<TokenCodec>, ttl: Duration) -> Result<Self, ConfigError> {
        check_token_ttl(ttl)?;
        Ok(Self { codec, ttl })
    }

    /// Sign a claim set expiring `ttl` after `now`. No side effects.
    pub fn issue(
        &self,
        identity: &VerifiedIdentity,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Signing("token expiry is out of range".into()))?;
        let claims = ClaimSet {
            sub: identity.username.clone(),
            id: identity.id,
            is_superuser: identity.is_superuser,
            exp: expires_at.timestamp(),
        };

        Ok(IssuedToken {
            access_token: self.codec.encode(&claims)?,
            token_type: TOKEN_TYPE,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_core::UserId;

    fn issuer(ttl: Duration) -> (Arc<TokenCodec>, SessionIssuer) {
        let codec = Arc::new(TokenCodec::new(b"0123456789abcdef0123456789abcdef"));
        let issuer = SessionIssuer::new(codec.clone(), ttl).unwrap();
        (codec, issuer)
    }

    fn bob() -> VerifiedIdentity {
        VerifiedIdentity {
            id: UserId::new(2),
            username: "bob".into(),
            is_superuser: true,
        }
    }

    #[test]
    fn issued_token_carries_identity_and_expiry() {
        let (codec, issuer) = issuer(Duration::minutes(20));
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();

        let issued = issuer.issue(&bob(), now).unwrap();
        assert_eq!(issued.token_type, "bearer");
        assert_eq!(issued.expires_at, now + Duration::minutes(20));

        let claims = codec.decode(&issued.access_token, now).unwrap();
        assert_eq!(claims.sub, "bob");
        assert_eq!(claims.id, UserId::new(2));
        assert!(claims.is_superuser);
        assert_eq!(claims.exp, 1_700_000_000 + 20 * 60);
    }

    #[test]
    fn token_is_unusable_after_ttl() {
        let (codec, issuer) = issuer(Duration::seconds(30));
        let now = Utc::now();
        let issued = issuer.issue(&bob(), now).unwrap();

        assert_eq!(
            codec.decode(&issued.access_token, now + Duration::seconds(30)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn wire_shape_has_no_expiry_field() {
        let (_, issuer) = issuer(Duration::minutes(1));
        let issued = issuer.issue(&bob(), Utc::now()).unwrap();
        let json = serde_json::to_value(&issued).unwrap();

        assert_eq!(json["token_type"], "bearer");
        assert!(json["access_token"].is_string());
        assert!(json.get("expires_at").is_none());
    }

    #[test]
    fn non_positive_ttl_is_rejected() {
        let codec = Arc::new(TokenCodec::new(b"0123456789abcdef0123456789abcdef"));
        assert!(SessionIssuer::new(codec.clone(), Duration::zero()).is_err());
        assert!(SessionIssuer::new(codec, Duration::seconds(-1)).is_err());
    }

    #[test]
    fn oversized_ttl_is_rejected() {
        let codec = Arc::new(TokenCodec::new(b"0123456789abcdef0123456789abcdef"));
        assert!(matches!(
            SessionIssuer::new(codec, Duration::minutes(200_000_000_000)),
            Err(ConfigError::TtlTooLong { .. })
        ));
    }

    #[test]
    fn expiry_overflow_is_an_error_not_a_panic() {
        let (_, issuer) = issuer(Duration::minutes(20));
        assert!(matches!(
            issuer.issue(&bob(), DateTime::<Utc>::MAX_UTC),
            Err(TokenError::Signing(_))
        ));
    }
}

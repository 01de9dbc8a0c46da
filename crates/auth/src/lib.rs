//! `scribe-auth`: credential and access-control core.
//!
//! Hashes and verifies passwords, issues and validates bearer tokens, and
//! gates requests on the superuser flag. Decoupled from HTTP; storage is
//! reached only through [`IdentityStore`].

pub mod accounts;
pub mod authenticate;
pub mod authorize;
pub mod claims;
pub mod config;
pub mod error;
pub mod identity;
pub mod password;
pub mod principal;
pub mod resolve;
pub mod session;
pub mod token;

#[cfg(test)]
mod testing;

pub use accounts::{AccountService, NewAccount};
pub use authenticate::Authenticator;
pub use authorize::{AuthzError, authorize_account_creation, require_superuser};
pub use claims::{ClaimSet, validate_claims};
pub use config::{AuthConfig, ConfigError};
pub use error::{AuthError, AuthResult};
pub use identity::{DuplicateField, IdentityRecord, IdentityStore, NewIdentity, StoreError};
pub use password::{HashError, PasswordHash, PasswordHasher};
pub use principal::{Principal, VerifiedIdentity};
pub use resolve::{IdentityResolver, RejectReason, Unauthorized};
pub use session::{IssuedToken, SessionIssuer};
pub use token::{TokenCodec, TokenError, TokenValidator};

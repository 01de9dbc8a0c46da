//! Error taxonomy of the credential and access-control core.

use thiserror::Error;

use crate::authorize::AuthzError;
use crate::identity::{DuplicateField, StoreError};
use crate::password::HashError;
use crate::resolve::Unauthorized;
use crate::token::TokenError;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown username, wrong password and disabled account all look alike.
    #[error("Could not validate user")]
    InvalidCredentials,

    #[error("Could not validate credentials")]
    TokenInvalid,

    /// Same wire outcome as `TokenInvalid`; kept apart for logs.
    #[error("Could not validate credentials")]
    TokenExpired,

    #[error(transparent)]
    InsufficientPrivilege(#[from] AuthzError),

    #[error("{0} already registered")]
    DuplicateIdentity(DuplicateField),

    #[error("Error on password change")]
    PasswordMismatch,

    #[error("{0}")]
    Validation(String),

    #[error("User not found")]
    NotFound,

    #[error("storage failure: {0}")]
    Storage(String),

    #[error(transparent)]
    Hashing(#[from] HashError),

    #[error("token signing failed: {0}")]
    Signing(String),
}

impl AuthError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Stable machine-readable code.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::TokenInvalid => "token_invalid",
            Self::TokenExpired => "token_expired",
            Self::InsufficientPrivilege(_) => "insufficient_privilege",
            Self::DuplicateIdentity(_) => "duplicate_identity",
            Self::PasswordMismatch => "password_mismatch",
            Self::Validation(_) => "validation_error",
            Self::NotFound => "not_found",
            Self::Storage(_) => "storage_error",
            Self::Hashing(_) => "hashing_error",
            Self::Signing(_) => "signing_error",
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUsername => Self::DuplicateIdentity(DuplicateField::Username),
            StoreError::DuplicateEmail => Self::DuplicateIdentity(DuplicateField::Email),
            StoreError::NotFound => Self::NotFound,
            StoreError::Backend(msg) => Self::Storage(msg),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Self::TokenExpired,
            TokenError::Signing(msg) => Self::Signing(msg),
            _ => Self::TokenInvalid,
        }
    }
}

impl From<Unauthorized> for AuthError {
    fn from(err: Unauthorized) -> Self {
        if err.is_expired() {
            Self::TokenExpired
        } else {
            Self::TokenInvalid
        }
    }
}

use thiserror::Error;

use crate::principal::Principal;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("The user doesn't have enough privileges")]
    SuperuserRequired,

    #[error("Only admins can create admin users.")]
    AdminCreationDenied,
}

/// Admit `principal` only if it carries the superuser flag.
///
/// - No IO
/// - No panics
/// - Pure policy check over the token snapshot
pub fn require_superuser(principal: Principal) -> Result<Principal, AuthzError> {
    if principal.is_superuser {
        Ok(principal)
    } else {
        Err(AuthzError::SuperuserRequired)
    }
}

/// Refuse a non-superuser asking for a superuser account.
///
/// Applies independently of any route-level guard.
pub fn authorize_account_creation(
    requester: &Principal,
    requested_superuser: bool,
) -> Result<(), AuthzError> {
    if requested_superuser && !requester.is_superuser {
        return Err(AuthzError::AdminCreationDenied);
    }
    Ok(())
}

use keyward_model::{AuthKey, UserId};
use thiserror::Error;

use crate::authorization::CredentialError;

/// Errors surfaced by [`Registry`](crate::Registry) operations.
///
/// Every variant is recoverable by the caller; a failed operation leaves the
/// registry exactly as it was before the call.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("No authorization registered under key {key}")]
    AuthorizationNotFound { key: AuthKey },

    #[error("Authentication failed for key {key}")]
    AuthenticationFailed {
        key: AuthKey,
        #[source]
        source: CredentialError,
    },

    #[error("Authorization {key} is already registered")]
    DuplicateAuthorization { key: AuthKey },

    #[error("User {user_id} not found")]
    UserNotFound { user_id: UserId },

    #[error("User {user_id} already exists")]
    UserAlreadyExists { user_id: UserId },

    #[error("User {user_id} already holds the maximum of {limit} authorizations")]
    AuthorizationLimitReached { user_id: UserId, limit: usize },

    #[error("Registry maps are inconsistent: {0}")]
    Inconsistent(#[from] ConsistencyError),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Referential integrity violations between the three registry maps.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    #[error("authorization {key} has no owner")]
    OrphanAuthorization { key: AuthKey },

    #[error("owner entry {key} has no authorization")]
    MissingAuthorization { key: AuthKey },

    #[error("key {key} is owned by unknown user {user_id}")]
    UnknownOwner { key: AuthKey, user_id: UserId },

    #[error("authorization stored under {stored} derives key {derived}")]
    KeyMismatch { stored: AuthKey, derived: AuthKey },

    #[error("user stored under {stored} carries id {actual}")]
    UserIdMismatch { stored: UserId, actual: UserId },
}

//! Credential-bearing authorizations.
//!
//! An authorization derives its own [`AuthKey`] from the state it was built
//! with and decides whether a set of authentication parameters is valid. The
//! registry never looks inside a credential; it only dispatches to
//! [`Authorization::authenticate`].

mod primary;
mod third_party;

pub use primary::PrimaryAuthorization;
pub use third_party::ThirdPartyAuthorization;

use std::fmt;

use keyward_model::{AuthKey, AuthKeyError};
use thiserror::Error;

/// Errors raised while building an authorization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    #[error("invalid auth key: {0}")]
    InvalidKey(#[from] AuthKeyError),

    #[error("credential secret must not be empty")]
    EmptySecret,
}

/// Why a credential check rejected the supplied parameters.
///
/// The registry propagates this unchanged as the source of
/// [`RegistryError::AuthenticationFailed`](crate::RegistryError::AuthenticationFailed).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("missing authentication parameter '{name}'")]
    MissingParameter { name: &'static str },

    #[error("malformed authentication parameter '{name}': {reason}")]
    MalformedParameter { name: &'static str, reason: String },

    #[error("counter {counter} was already used (last accepted {last_accepted})")]
    Replayed { counter: u64, last_accepted: u64 },

    #[error("credential mismatch")]
    Mismatch,
}

/// Variant tag, mostly for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorizationKind {
    Primary,
    ThirdParty,
}

impl AuthorizationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::ThirdParty => "third_party",
        }
    }
}

impl fmt::Display for AuthorizationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered credential.
#[derive(Debug, Clone)]
pub enum Authorization {
    /// Locally issued shared-secret credential, bound when the user is created.
    Primary(PrimaryAuthorization),
    /// Credential vouched for by an external provider, attached later.
    ThirdParty(ThirdPartyAuthorization),
}

impl Authorization {
    /// The key this authorization is stored under.
    pub fn key(&self) -> &AuthKey {
        match self {
            Self::Primary(auth) => auth.key(),
            Self::ThirdParty(auth) => auth.key(),
        }
    }

    pub fn kind(&self) -> AuthorizationKind {
        match self {
            Self::Primary(_) => AuthorizationKind::Primary,
            Self::ThirdParty(_) => AuthorizationKind::ThirdParty,
        }
    }

    /// Check `params` against the credential.
    ///
    /// Takes `&mut self` because some variants advance challenge state
    /// (the third-party replay counter) on success.
    pub fn authenticate(
        &mut self,
        params: &[&str],
    ) -> Result<(), CredentialError> {
        match self {
            Self::Primary(auth) => auth.authenticate(params),
            Self::ThirdParty(auth) => auth.authenticate(params),
        }
    }
}

impl From<PrimaryAuthorization> for Authorization {
    fn from(auth: PrimaryAuthorization) -> Self {
        Self::Primary(auth)
    }
}

impl From<ThirdPartyAuthorization> for Authorization {
    fn from(auth: ThirdPartyAuthorization) -> Self {
        Self::ThirdParty(auth)
    }
}

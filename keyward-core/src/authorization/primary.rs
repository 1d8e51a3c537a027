use std::fmt;

use constant_time_eq::constant_time_eq;
use keyward_model::AuthKey;
use uuid::Uuid;
use zeroize::Zeroizing;

use super::{AuthorizationError, CredentialError};

/// Shared-secret credential created together with its user.
///
/// Authentication expects the secret as the first parameter and compares it
/// in constant time.
#[derive(Clone)]
pub struct PrimaryAuthorization {
    key: AuthKey,
    secret: Zeroizing<String>,
}

impl PrimaryAuthorization {
    pub fn new(
        publisher: impl Into<String>,
        token: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self, AuthorizationError> {
        let key = AuthKey::new(publisher, token)?;
        let secret = Zeroizing::new(secret.into());
        if secret.is_empty() {
            return Err(AuthorizationError::EmptySecret);
        }
        Ok(Self { key, secret })
    }

    /// Mint a primary authorization under a fresh random token.
    pub fn generate(
        publisher: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self, AuthorizationError> {
        Self::new(publisher, Uuid::new_v4().to_string(), secret)
    }

    pub fn key(&self) -> &AuthKey {
        &self.key
    }

    pub fn authenticate(&self, params: &[&str]) -> Result<(), CredentialError> {
        let presented = params
            .first()
            .ok_or(CredentialError::MissingParameter { name: "secret" })?;

        let expected = self.secret.as_bytes();
        let presented = presented.as_bytes();

        if expected.len() != presented.len()
            || !constant_time_eq(expected, presented)
        {
            return Err(CredentialError::Mismatch);
        }

        Ok(())
    }
}

impl fmt::Debug for PrimaryAuthorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimaryAuthorization")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_secret() {
        let auth = PrimaryAuthorization::new("pub1", "abc", "secret").unwrap();
        assert!(auth.authenticate(&["secret"]).is_ok());
        // extra parameters are ignored
        assert!(auth.authenticate(&["secret", "ignored"]).is_ok());
    }

    #[test]
    fn rejects_wrong_or_missing_secret() {
        let auth = PrimaryAuthorization::new("pub1", "abc", "secret").unwrap();
        assert_eq!(auth.authenticate(&["Secret"]), Err(CredentialError::Mismatch));
        assert_eq!(auth.authenticate(&["secret2"]), Err(CredentialError::Mismatch));
        assert_eq!(
            auth.authenticate(&[]),
            Err(CredentialError::MissingParameter { name: "secret" })
        );
    }

    #[test]
    fn rejects_empty_secret() {
        assert_eq!(
            PrimaryAuthorization::new("pub1", "abc", "").unwrap_err(),
            AuthorizationError::EmptySecret
        );
    }

    #[test]
    fn generated_tokens_are_unique() {
        let a = PrimaryAuthorization::generate("local", "pw").unwrap();
        let b = PrimaryAuthorization::generate("local", "pw").unwrap();
        assert_eq!(a.key().publisher(), "local");
        assert_ne!(a.key(), b.key());
        assert!(Uuid::parse_str(a.key().token()).is_ok());
    }

    #[test]
    fn debug_redacts_secret() {
        let auth = PrimaryAuthorization::new("pub1", "abc", "hunter2").unwrap();
        let rendered = format!("{auth:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}

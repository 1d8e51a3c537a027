use std::fmt;

use hmac::{Hmac, Mac};
use keyward_model::AuthKey;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::{AuthorizationError, CredentialError};

type HmacSha256 = Hmac<Sha256>;

/// Credential vouched for by an external provider.
///
/// The key is `provider-subject`. The provider signs tickets of the form
/// `"{key}:{counter}"` with a shared signing key (HMAC-SHA-256, hex encoded);
/// authentication takes `[counter, signature]` and only accepts counters
/// strictly above the last accepted one.
#[derive(Clone)]
pub struct ThirdPartyAuthorization {
    key: AuthKey,
    signing_key: Zeroizing<Vec<u8>>,
    last_counter: u64,
}

impl ThirdPartyAuthorization {
    pub fn new(
        provider: impl Into<String>,
        subject: impl Into<String>,
        signing_key: impl AsRef<[u8]>,
    ) -> Result<Self, AuthorizationError> {
        let key = AuthKey::new(provider, subject)?;
        let signing_key = signing_key.as_ref();
        if signing_key.is_empty() {
            return Err(AuthorizationError::EmptySecret);
        }

        Ok(Self {
            key,
            signing_key: Zeroizing::new(signing_key.to_vec()),
            last_counter: 0,
        })
    }

    /// Restore the replay counter, e.g. when rebuilding from stored state.
    pub fn with_last_counter(mut self, last_counter: u64) -> Self {
        self.last_counter = last_counter;
        self
    }

    pub fn key(&self) -> &AuthKey {
        &self.key
    }

    pub fn provider(&self) -> &str {
        self.key.publisher()
    }

    pub fn subject(&self) -> &str {
        self.key.token()
    }

    pub fn last_counter(&self) -> u64 {
        self.last_counter
    }

    /// Provider-side signature for `counter`, hex encoded.
    pub fn issue_ticket(&self, counter: u64) -> String {
        let mac = self.ticket_mac(counter);
        hex::encode(mac.finalize().into_bytes())
    }

    pub fn authenticate(
        &mut self,
        params: &[&str],
    ) -> Result<(), CredentialError> {
        let counter_raw = params
            .first()
            .ok_or(CredentialError::MissingParameter { name: "counter" })?;
        let counter: u64 = counter_raw.parse().map_err(
            |err: std::num::ParseIntError| {
                CredentialError::MalformedParameter {
                    name: "counter",
                    reason: err.to_string(),
                }
            },
        )?;

        let signature_hex = params
            .get(1)
            .ok_or(CredentialError::MissingParameter { name: "signature" })?;
        let signature = hex::decode(signature_hex).map_err(|err| {
            CredentialError::MalformedParameter {
                name: "signature",
                reason: err.to_string(),
            }
        })?;

        // Replay status is only reported for authentic tickets.
        self.ticket_mac(counter)
            .verify_slice(&signature)
            .map_err(|_| CredentialError::Mismatch)?;

        if counter <= self.last_counter {
            return Err(CredentialError::Replayed {
                counter,
                last_accepted: self.last_counter,
            });
        }

        self.last_counter = counter;
        Ok(())
    }

    fn ticket_mac(&self, counter: u64) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(&self.signing_key)
            .expect("HMAC-SHA-256 accepts keys of any size");
        mac.update(self.key.to_string().as_bytes());
        mac.update(b":");
        mac.update(counter.to_string().as_bytes());
        mac
    }
}

impl fmt::Debug for ThirdPartyAuthorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThirdPartyAuthorization")
            .field("key", &self.key)
            .field("signing_key", &"<redacted>")
            .field("last_counter", &self.last_counter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn github() -> ThirdPartyAuthorization {
        ThirdPartyAuthorization::new("github", "octocat", b"provider-key")
            .unwrap()
    }

    #[test]
    fn accepts_signed_ticket_and_advances_counter() {
        let mut auth = github();
        let ticket = auth.issue_ticket(1);
        assert!(auth.authenticate(&["1", ticket.as_str()]).is_ok());
        assert_eq!(auth.last_counter(), 1);

        let ticket = auth.issue_ticket(5);
        assert!(auth.authenticate(&["5", ticket.as_str()]).is_ok());
        assert_eq!(auth.last_counter(), 5);
    }

    #[test]
    fn rejects_replayed_counter() {
        let mut auth = github();
        let ticket = auth.issue_ticket(3);
        auth.authenticate(&["3", ticket.as_str()]).unwrap();

        assert_eq!(
            auth.authenticate(&["3", ticket.as_str()]),
            Err(CredentialError::Replayed {
                counter: 3,
                last_accepted: 3
            })
        );
        let older = auth.issue_ticket(2);
        assert!(matches!(
            auth.authenticate(&["2", older.as_str()]),
            Err(CredentialError::Replayed { .. })
        ));
        assert_eq!(auth.last_counter(), 3);
    }

    #[test]
    fn counter_zero_is_never_accepted() {
        let mut auth = github();
        let ticket = auth.issue_ticket(0);
        assert!(matches!(
            auth.authenticate(&["0", ticket.as_str()]),
            Err(CredentialError::Replayed { .. })
        ));
    }

    #[test]
    fn rejects_forged_or_malformed_tickets() {
        let mut auth = github();
        let other = ThirdPartyAuthorization::new("github", "octocat", b"other")
            .unwrap();

        let forged = other.issue_ticket(1);
        assert_eq!(
            auth.authenticate(&["1", forged.as_str()]),
            Err(CredentialError::Mismatch)
        );

        // ticket bound to a different counter
        let ticket = auth.issue_ticket(2);
        assert_eq!(
            auth.authenticate(&["1", ticket.as_str()]),
            Err(CredentialError::Mismatch)
        );

        assert!(matches!(
            auth.authenticate(&["one", ticket.as_str()]),
            Err(CredentialError::MalformedParameter { name: "counter", .. })
        ));
        assert!(matches!(
            auth.authenticate(&["2", "zz"]),
            Err(CredentialError::MalformedParameter {
                name: "signature",
                ..
            })
        ));
        assert_eq!(
            auth.authenticate(&["2"]),
            Err(CredentialError::MissingParameter { name: "signature" })
        );
        assert_eq!(auth.last_counter(), 0);
    }

    #[test]
    fn restored_counter_blocks_older_tickets() {
        let mut auth = github().with_last_counter(10);
        let ticket = auth.issue_ticket(10);
        assert!(matches!(
            auth.authenticate(&["10", ticket.as_str()]),
            Err(CredentialError::Replayed { .. })
        ));
        let ticket = auth.issue_ticket(11);
        assert!(auth.authenticate(&["11", ticket.as_str()]).is_ok());
    }
}

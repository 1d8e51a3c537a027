use std::fmt;

use serde::{Deserialize, Serialize};

/// What to do when a primary registration names a user id that already
/// exists.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReregistrationPolicy {
    /// Replace the existing user record; authorizations already bound to the
    /// id stay bound.
    #[default]
    Overwrite,
    /// Fail with `UserAlreadyExists`.
    Reject,
}

impl fmt::Display for ReregistrationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overwrite => write!(f, "overwrite"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

/// Tunable rules enforced by the registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RegistryPolicy {
    /// Handling of repeated primary registration for the same user id.
    pub reregistration: ReregistrationPolicy,
    /// Upper bound on keys a user may hold before further secondary
    /// authorizations are refused. `None` means unlimited.
    pub max_authorizations_per_user: Option<usize>,
}

impl RegistryPolicy {
    pub fn strict() -> Self {
        Self {
            reregistration: ReregistrationPolicy::Reject,
            ..Self::default()
        }
    }

    pub fn with_max_authorizations(mut self, limit: usize) -> Self {
        self.max_authorizations_per_user = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_preserves_overwrite() {
        let policy = RegistryPolicy::default();
        assert_eq!(policy.reregistration, ReregistrationPolicy::Overwrite);
        assert_eq!(policy.max_authorizations_per_user, None);
    }

    #[test]
    fn deserializes_partial_json() {
        let policy: RegistryPolicy =
            serde_json::from_str(r#"{"reregistration":"reject"}"#).unwrap();
        assert_eq!(policy, RegistryPolicy::strict());

        let policy: RegistryPolicy =
            serde_json::from_str(r#"{"max_authorizations_per_user":3}"#)
                .unwrap();
        assert_eq!(policy, RegistryPolicy::default().with_max_authorizations(3));
    }
}

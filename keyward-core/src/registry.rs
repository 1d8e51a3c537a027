//! User / authorization registry.
//!
//! Three maps are kept in lockstep:
//! - user id -> [`User`]
//! - auth key -> [`Authorization`]
//! - auth key -> owning user id
//!
//! Every key in the authorization map has an owner entry naming an existing
//! user, and every owner entry has an authorization. Operations validate all
//! preconditions before touching any map, so a failed call never leaves a
//! partial update behind.

use std::collections::HashMap;

use keyward_model::{AuthKey, User, UserId};
use tracing::{debug, info, warn};

use crate::authorization::{Authorization, ThirdPartyAuthorization};
use crate::error::{ConsistencyError, RegistryError, Result};
use crate::policy::{RegistryPolicy, ReregistrationPolicy};

/// The three backing maps, detached from a [`Registry`].
///
/// Used to move registry contents in and out in bulk (for example by a
/// persistence collaborator). A bundle is only installed into a registry
/// after [`RegistryParts::check_consistency`] accepts it.
#[derive(Debug, Default, Clone)]
pub struct RegistryParts {
    pub users: HashMap<UserId, User>,
    pub authorizations: HashMap<AuthKey, Authorization>,
    pub owners: HashMap<AuthKey, UserId>,
}

impl RegistryParts {
    /// Verify referential integrity across the three maps.
    pub fn check_consistency(
        &self,
    ) -> std::result::Result<(), ConsistencyError> {
        check_maps(&self.users, &self.authorizations, &self.owners)
    }
}

fn check_maps(
    users: &HashMap<UserId, User>,
    authorizations: &HashMap<AuthKey, Authorization>,
    owners: &HashMap<AuthKey, UserId>,
) -> std::result::Result<(), ConsistencyError> {
    for (stored, user) in users {
        if &user.id != stored {
            return Err(ConsistencyError::UserIdMismatch {
                stored: stored.clone(),
                actual: user.id.clone(),
            });
        }
    }

    for (key, auth) in authorizations {
        if auth.key() != key {
            return Err(ConsistencyError::KeyMismatch {
                stored: key.clone(),
                derived: auth.key().clone(),
            });
        }

        let Some(user_id) = owners.get(key) else {
            return Err(ConsistencyError::OrphanAuthorization {
                key: key.clone(),
            });
        };

        if !users.contains_key(user_id) {
            return Err(ConsistencyError::UnknownOwner {
                key: key.clone(),
                user_id: user_id.clone(),
            });
        }
    }

    if let Some(key) = owners
        .keys()
        .find(|key| !authorizations.contains_key(*key))
    {
        return Err(ConsistencyError::MissingAuthorization { key: key.clone() });
    }

    Ok(())
}

/// In-memory registry binding users to their authorizations.
///
/// Single-owner and synchronous: every mutating call (authentication
/// included) takes `&mut self`. Wrap it in a
/// [`SharedRegistry`](crate::SharedRegistry) to use it from several threads.
#[derive(Debug, Default)]
pub struct Registry {
    users: HashMap<UserId, User>,
    authorizations: HashMap<AuthKey, Authorization>,
    owners: HashMap<AuthKey, UserId>,
    policy: RegistryPolicy,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: RegistryPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Build a registry from previously exported maps.
    pub fn from_parts(
        parts: RegistryParts,
        policy: RegistryPolicy,
    ) -> Result<Self> {
        parts.check_consistency()?;

        let RegistryParts {
            users,
            authorizations,
            owners,
        } = parts;

        Ok(Self {
            users,
            authorizations,
            owners,
            policy,
        })
    }

    /// Detach the backing maps.
    pub fn into_parts(self) -> RegistryParts {
        RegistryParts {
            users: self.users,
            authorizations: self.authorizations,
            owners: self.owners,
        }
    }

    /// Swap in a new set of maps, returning the previous ones.
    ///
    /// An inconsistent bundle is rejected and the current maps are kept.
    pub fn replace_parts(
        &mut self,
        parts: RegistryParts,
    ) -> Result<RegistryParts> {
        parts.check_consistency()?;

        let previous = RegistryParts {
            users: std::mem::replace(&mut self.users, parts.users),
            authorizations: std::mem::replace(
                &mut self.authorizations,
                parts.authorizations,
            ),
            owners: std::mem::replace(&mut self.owners, parts.owners),
        };

        info!(
            target: "keyward::registry",
            users = self.users.len(),
            authorizations = self.authorizations.len(),
            "replaced registry contents"
        );

        Ok(previous)
    }

    pub fn policy(&self) -> &RegistryPolicy {
        &self.policy
    }

    pub fn set_policy(&mut self, policy: RegistryPolicy) {
        self.policy = policy;
    }

    pub fn users(&self) -> &HashMap<UserId, User> {
        &self.users
    }

    pub fn authorizations(&self) -> &HashMap<AuthKey, Authorization> {
        &self.authorizations
    }

    pub fn owners(&self) -> &HashMap<AuthKey, UserId> {
        &self.owners
    }

    pub fn user(&self, user_id: &UserId) -> Option<&User> {
        self.users.get(user_id)
    }

    pub fn contains_user(&self, user_id: &UserId) -> bool {
        self.users.contains_key(user_id)
    }

    pub fn authorization(&self, key: &AuthKey) -> Option<&Authorization> {
        self.authorizations.get(key)
    }

    pub fn owner_of(&self, key: &AuthKey) -> Option<&UserId> {
        self.owners.get(key)
    }

    /// Keys bound to `user_id`, in sorted order.
    pub fn keys_for_user(&self, user_id: &UserId) -> Vec<&AuthKey> {
        let mut keys: Vec<&AuthKey> = self
            .owners
            .iter()
            .filter(|(_, owner)| *owner == user_id)
            .map(|(key, _)| key)
            .collect();
        keys.sort();
        keys
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn authorization_count(&self) -> usize {
        self.authorizations.len()
    }

    /// Integrity check over the live maps.
    pub fn check_consistency(
        &self,
    ) -> std::result::Result<(), ConsistencyError> {
        check_maps(&self.users, &self.authorizations, &self.owners)
    }

    /// Authenticate against the authorization stored under `key` and return
    /// the id of the user it belongs to.
    ///
    /// The registry maps are left untouched; the authorization itself may
    /// advance its own challenge state.
    pub fn authenticate_and_get_user_id(
        &mut self,
        key: &AuthKey,
        params: &[&str],
    ) -> Result<UserId> {
        let Some(auth) = self.authorizations.get_mut(key) else {
            debug!(target: "keyward::registry", key = %key, "authentication for unknown key");
            return Err(RegistryError::AuthorizationNotFound { key: key.clone() });
        };

        if let Err(source) = auth.authenticate(params) {
            warn!(
                target: "keyward::registry",
                key = %key,
                kind = %auth.kind(),
                error = %source,
                "authentication failed"
            );
            return Err(RegistryError::AuthenticationFailed {
                key: key.clone(),
                source,
            });
        }

        let user_id = self.owners.get(key).cloned().ok_or_else(|| {
            ConsistencyError::OrphanAuthorization { key: key.clone() }
        })?;

        debug!(target: "keyward::registry", key = %key, user_id = %user_id, "authenticated");
        Ok(user_id)
    }

    /// Create `user_id` together with its primary authorization.
    ///
    /// Fails with `DuplicateAuthorization` if the derived key is already
    /// bound. An existing user record is replaced or rejected according to
    /// [`RegistryPolicy::reregistration`].
    pub fn register_user_with_authorization(
        &mut self,
        user_id: UserId,
        auth: impl Into<Authorization>,
    ) -> Result<AuthKey> {
        let auth = auth.into();
        let key = auth.key().clone();

        if self.authorizations.contains_key(&key) {
            warn!(target: "keyward::registry", key = %key, user_id = %user_id, "duplicate authorization on registration");
            return Err(RegistryError::DuplicateAuthorization { key });
        }

        if self.users.contains_key(&user_id) {
            match self.policy.reregistration {
                ReregistrationPolicy::Reject => {
                    warn!(target: "keyward::registry", user_id = %user_id, "user already exists");
                    return Err(RegistryError::UserAlreadyExists { user_id });
                }
                ReregistrationPolicy::Overwrite => {
                    debug!(target: "keyward::registry", user_id = %user_id, "overwriting existing user record");
                }
            }
        }

        let kind = auth.kind();
        self.users
            .insert(user_id.clone(), User::new(user_id.clone()));
        self.authorizations.insert(key.clone(), auth);
        self.owners.insert(key.clone(), user_id.clone());

        info!(
            target: "keyward::registry",
            user_id = %user_id,
            key = %key,
            kind = %kind,
            "registered user"
        );
        Ok(key)
    }

    /// Attach a secondary authorization to an existing user.
    ///
    /// Checks run in order: duplicate key, unknown user, per-user limit.
    pub fn add_authorization_to_user(
        &mut self,
        user_id: &UserId,
        auth: ThirdPartyAuthorization,
    ) -> Result<AuthKey> {
        let key = auth.key().clone();

        if self.authorizations.contains_key(&key) {
            warn!(target: "keyward::registry", key = %key, user_id = %user_id, "duplicate authorization on attach");
            return Err(RegistryError::DuplicateAuthorization { key });
        }

        if !self.users.contains_key(user_id) {
            warn!(target: "keyward::registry", key = %key, user_id = %user_id, "attach to unknown user");
            return Err(RegistryError::UserNotFound {
                user_id: user_id.clone(),
            });
        }

        if let Some(limit) = self.policy.max_authorizations_per_user {
            let held = self
                .owners
                .values()
                .filter(|owner| *owner == user_id)
                .count();
            if held >= limit {
                warn!(target: "keyward::registry", user_id = %user_id, limit, "authorization limit reached");
                return Err(RegistryError::AuthorizationLimitReached {
                    user_id: user_id.clone(),
                    limit,
                });
            }
        }

        self.authorizations
            .insert(key.clone(), Authorization::ThirdParty(auth));
        self.owners.insert(key.clone(), user_id.clone());

        info!(
            target: "keyward::registry",
            user_id = %user_id,
            key = %key,
            "attached third-party authorization"
        );
        Ok(key)
    }
}

use std::collections::HashMap;

use anyhow::{Context, Result};
use keyward_core::{
    AuthKey, PrimaryAuthorization, Registry, RegistryPolicy,
    ThirdPartyAuthorization, UserId,
};

use super::constants::{TEST_PROVIDER_KEY, TEST_PUBLISHER, TEST_SECRET};

/// Snapshot of the registry's key -> owner bindings, for before/after
/// comparisons around failing calls.
pub type Bindings = HashMap<AuthKey, UserId>;

/// Registry wrapper with convenience constructors for integration tests.
pub struct TestRegistryHarness {
    registry: Registry,
}

#[allow(dead_code)]
impl TestRegistryHarness {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
        }
    }

    pub fn with_policy(policy: RegistryPolicy) -> Self {
        Self {
            registry: Registry::with_policy(policy),
        }
    }

    pub fn registry(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Register `user` with a primary authorization `TEST_PUBLISHER-{token}`.
    pub fn create_user(&mut self, user: &str, token: &str) -> Result<AuthKey> {
        let user_id = UserId::new(user)?;
        let auth =
            PrimaryAuthorization::new(TEST_PUBLISHER, token, TEST_SECRET)?;
        self.registry
            .register_user_with_authorization(user_id, auth)
            .with_context(|| format!("registering {user}"))
    }

    pub fn provider_auth(
        &self,
        provider: &str,
        subject: &str,
    ) -> Result<ThirdPartyAuthorization> {
        Ok(ThirdPartyAuthorization::new(
            provider,
            subject,
            TEST_PROVIDER_KEY,
        )?)
    }

    pub fn bindings(&self) -> Bindings {
        self.registry.owners().clone()
    }

    pub fn assert_consistent(&self) {
        self.registry
            .check_consistency()
            .expect("registry maps consistent");
        assert_eq!(
            self.registry.owners().len(),
            self.registry.authorization_count()
        );
    }
}

use std::sync::Arc;

use keyward_model::{AuthKey, UserId};
use parking_lot::Mutex;

use crate::authorization::{Authorization, ThirdPartyAuthorization};
use crate::error::Result;
use crate::registry::Registry;

/// Thread-safe handle around a [`Registry`].
///
/// All operations are serialized through one mutex. Authentication needs the
/// exclusive lock too, since authorizations may update challenge state.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<Mutex<Registry>>,
}

impl SharedRegistry {
    pub fn new(registry: Registry) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    pub fn authenticate_and_get_user_id(
        &self,
        key: &AuthKey,
        params: &[&str],
    ) -> Result<UserId> {
        self.inner.lock().authenticate_and_get_user_id(key, params)
    }

    pub fn register_user_with_authorization(
        &self,
        user_id: UserId,
        auth: impl Into<Authorization>,
    ) -> Result<AuthKey> {
        self.inner
            .lock()
            .register_user_with_authorization(user_id, auth)
    }

    pub fn add_authorization_to_user(
        &self,
        user_id: &UserId,
        auth: ThirdPartyAuthorization,
    ) -> Result<AuthKey> {
        self.inner.lock().add_authorization_to_user(user_id, auth)
    }

    /// Run `f` with the registry locked.
    pub fn with_registry<R>(&self, f: impl FnOnce(&mut Registry) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authorization::PrimaryAuthorization;
    use std::thread;

    #[test]
    fn concurrent_registrations_keep_maps_consistent() {
        let shared = SharedRegistry::default();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let user_id = UserId::new(format!("user{i}")).unwrap();
                    // every thread races for the same contested key as well
                    let contested =
                        PrimaryAuthorization::new("pub1", "shared", "s").unwrap();
                    let own = PrimaryAuthorization::new(
                        "pub1",
                        format!("own{i}"),
                        "s",
                    )
                    .unwrap();
                    let _ = shared.register_user_with_authorization(
                        user_id.clone(),
                        contested,
                    );
                    shared
                        .register_user_with_authorization(user_id, own)
                        .unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        shared.with_registry(|registry| {
            assert_eq!(registry.user_count(), 8);
            assert_eq!(registry.authorization_count(), 9);
            registry.check_consistency().unwrap();
        });

        let key: AuthKey = "pub1-own3".parse().unwrap();
        assert_eq!(
            shared.authenticate_and_get_user_id(&key, &["s"]).unwrap(),
            UserId::new("user3").unwrap()
        );
    }
}

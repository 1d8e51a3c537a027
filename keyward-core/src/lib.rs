//! # keyward-core
//!
//! In-memory registry mapping users to authorization credentials and
//! validating authentication attempts against them.
//!
//! - [`Registry`] owns three maps (users, authorizations, key owners) and keeps
//!   them referentially consistent across every operation.
//! - [`Authorization`] is either a [`PrimaryAuthorization`] (shared secret,
//!   bound at user creation) or a [`ThirdPartyAuthorization`] (provider-signed
//!   tickets with a replay counter, attached later).
//! - [`SharedRegistry`] serializes access for multi-threaded callers.
//!
//! ```
//! use keyward_core::{AuthKey, PrimaryAuthorization, Registry, UserId};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = Registry::new();
//! let auth = PrimaryAuthorization::new("pub1", "abc", "secret")?;
//! registry.register_user_with_authorization(UserId::new("u1")?, auth)?;
//!
//! let key: AuthKey = "pub1-abc".parse()?;
//! let user = registry.authenticate_and_get_user_id(&key, &["secret"])?;
//! assert_eq!(user.as_str(), "u1");
//! # Ok(())
//! # }
//! ```
#![allow(missing_docs)]

pub mod authorization;
pub mod error;
pub mod policy;
pub mod registry;
pub mod shared;

pub use authorization::{
    Authorization, AuthorizationError, AuthorizationKind, CredentialError,
    PrimaryAuthorization, ThirdPartyAuthorization,
};
pub use error::{ConsistencyError, RegistryError, Result};
pub use policy::{RegistryPolicy, ReregistrationPolicy};
pub use registry::{Registry, RegistryParts};
pub use shared::SharedRegistry;

pub use keyward_model::{AuthKey, AuthKeyError, User, UserId, UserIdError};

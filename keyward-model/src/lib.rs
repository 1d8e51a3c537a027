//! Value types shared across keyward crates.
#![allow(missing_docs)]

pub mod auth_key;
pub mod user;

pub use auth_key::{AUTH_KEY_SEPARATOR, AuthKey, AuthKeyError};
pub use user::{User, UserId, UserIdError};

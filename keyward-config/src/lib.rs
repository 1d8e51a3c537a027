//! Configuration loading for keyward.
//!
//! The registry's tunables live in [`keyward_core::RegistryPolicy`]; this
//! crate finds and parses them from the environment or from a TOML / JSON
//! file, and reports where they came from.

pub mod loader;

pub use loader::{
    CONFIG_JSON_ENV, CONFIG_PATH_ENV, ConfigSource, KeywardConfig,
};

//! Shared constants for core integration tests.

#[allow(dead_code)]
pub const TEST_PUBLISHER: &str = "pub1";
#[allow(dead_code)]
pub const TEST_SECRET: &str = "secret";
#[allow(dead_code)]
pub const TEST_PROVIDER_KEY: &[u8] = b"provider-signing-key";

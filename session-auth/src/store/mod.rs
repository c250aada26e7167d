//! Key-value storage for the persisted credential pair.

mod file;
mod memory;

use async_trait::async_trait;

use crate::error::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Storage key holding the access token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Storage key holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Process-wide key-value store backing the session.
///
/// The store is shared mutable state. It offers no compare-and-swap, so two
/// writers racing on the same key resolve as last writer wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), Error>;
}

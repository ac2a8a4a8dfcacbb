//! Storage Module
//!
//! The key-value medium the cache persists into. The cache only ever touches
//! keys under its own prefixes, so a medium can be shared with other data.

mod memory;

use thiserror::Error;

pub use memory::MemoryStorage;

// == Storage Error ==
/// Failures reported by a storage medium.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The write would exceed the medium's capacity
    #[error("Storage quota exceeded: {needed} bytes needed, {available} available")]
    QuotaExceeded { needed: usize, available: usize },

    /// The medium cannot be reached
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

// == Storage Trait ==
/// A scoped text key-value store.
pub trait Storage: Send + Sync {
    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Removes `key`; removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Lists every key currently held by the medium.
    fn keys(&self) -> Result<Vec<String>, StorageError>;

    /// Lists the keys that start with `prefix`.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .keys()?
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .collect())
    }
}

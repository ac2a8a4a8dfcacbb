//! Cache Module
//!
//! The caching engine: method codec, key derivation, the cacheability
//! registry and the TTL-bound response store.

mod entry;
mod key;
mod method;
mod registry;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use key::{derive_key, hash_string, BodyFingerprint, RequestBody, ENTRY_PREFIX};
pub use method::{Method, MethodSet, MethodSpec};
pub use registry::{ServiceCacheConfig, ServiceRegistry, SERVICE_PREFIX};
pub use stats::CacheStats;
pub use store::CacheStore;

//! Cache Entry Module
//!
//! Defines the persisted form of a cached response and its TTL checks.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::proxy::Response;

// == Cache Entry ==
/// A stored response together with the time it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// The cached response
    pub response: Response,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry stamped with the current time.
    pub fn new(response: Response) -> Self {
        Self::with_timestamp(response, current_timestamp_ms())
    }

    pub fn with_timestamp(response: Response, created_at: u64) -> Self {
        Self {
            created_at,
            response,
        }
    }

    // == Expiry ==
    /// Returns the Unix millisecond timestamp at which the entry expires
    /// under the given TTL.
    pub fn expires_at(&self, ttl: Duration) -> u64 {
        self.created_at.saturating_add(ttl_ms(ttl))
    }

    /// Checks whether the entry has expired at `now_ms`.
    ///
    /// Boundary condition: an entry is expired once `now >= created_at + ttl`,
    /// so an entry looked up exactly at its TTL is already a miss.
    pub fn is_expired_at(&self, ttl: Duration, now_ms: u64) -> bool {
        now_ms >= self.expires_at(ttl)
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.is_expired_at(ttl, current_timestamp_ms())
    }

    // == Serialization ==
    /// Encodes the entry into its persisted JSON form.
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decodes a persisted entry; malformed input yields `None`.
    pub fn decode(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}

fn ttl_ms(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)
}

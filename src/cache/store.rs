//! Cache Store Module
//!
//! Persists responses under derived keys and enforces TTL expiration, both
//! lazily on lookup and proactively through sweeps.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, CacheStats, ENTRY_PREFIX};
use crate::proxy::Response;
use crate::storage::{Storage, StorageError};

// == Cache Store ==
/// Response cache persisted in a [`Storage`] medium.
///
/// Every read-modify-write against the medium runs under a single lock, so
/// lookups, writes, flushes and sweeps never interleave.
pub struct CacheStore {
    /// Backing medium
    storage: Arc<dyn Storage>,
    /// Lifetime of an entry, applied when it is evaluated
    ttl: RwLock<Duration>,
    /// Activity counters
    stats: Mutex<CacheStats>,
    /// Serializes access to the medium
    io: Mutex<()>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store over `storage` with the given entry TTL.
    pub fn new(storage: Arc<dyn Storage>, ttl: Duration) -> Self {
        Self {
            storage,
            ttl: RwLock::new(ttl),
            stats: Mutex::new(CacheStats::new()),
            io: Mutex::new(()),
        }
    }

    // == TTL ==
    pub fn ttl(&self) -> Duration {
        *self.ttl.read()
    }

    /// Changes the TTL. Stored timestamps are untouched; the new value
    /// applies to every later lookup and sweep.
    pub fn set_ttl(&self, ttl: Duration) {
        *self.ttl.write() = ttl;
    }

    // == Lookup ==
    /// Returns the response stored under `key` if it is still valid.
    pub fn lookup(&self, key: &str) -> Option<Response> {
        self.lookup_at(key, current_timestamp_ms())
    }

    /// Like [`lookup`](Self::lookup), evaluated at `now_ms`.
    ///
    /// Expired and malformed entries are removed and reported as misses.
    pub fn lookup_at(&self, key: &str, now_ms: u64) -> Option<Response> {
        let ttl = self.ttl();
        let _guard = self.io.lock();

        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("Cache miss: {}", key);
                self.stats.lock().record_miss();
                return None;
            }
            Err(e) => {
                warn!("Cache read failed for {}: {}", key, e);
                self.stats.lock().record_miss();
                return None;
            }
        };

        let Some(entry) = CacheEntry::decode(&raw) else {
            warn!("Discarding malformed cache entry: {}", key);
            self.discard(key);
            self.stats.lock().record_miss();
            return None;
        };

        if entry.is_expired_at(ttl, now_ms) {
            debug!("Cache entry expired: {}", key);
            self.discard(key);
            let mut stats = self.stats.lock();
            stats.record_evictions(1);
            stats.record_miss();
            return None;
        }

        debug!("Cache hit: {}", key);
        self.stats.lock().record_hit();
        Some(entry.response)
    }

    // == Store ==
    /// Stores `response` under `key`, stamped with the current time.
    pub fn store(&self, key: &str, response: Response) -> Result<(), StorageError> {
        self.store_at(key, response, current_timestamp_ms())
    }

    /// Like [`store`](Self::store) with an explicit creation timestamp.
    pub fn store_at(
        &self,
        key: &str,
        response: Response,
        created_at: u64,
    ) -> Result<(), StorageError> {
        let entry = CacheEntry::with_timestamp(response, created_at);
        let raw = entry
            .encode()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        let result = {
            let _guard = self.io.lock();
            self.storage.set(key, raw)
        };

        let mut stats = self.stats.lock();
        match &result {
            Ok(()) => {
                debug!("Cached response: {}", key);
                stats.record_store();
            }
            Err(_) => stats.record_store_failure(),
        }
        result
    }

    // == Flush ==
    /// Removes every cache entry; service registrations and unrelated keys
    /// in the medium are left alone.
    ///
    /// Returns the number of entries removed.
    pub fn flush(&self) -> Result<usize, StorageError> {
        let _guard = self.io.lock();

        let keys = self.storage.keys_with_prefix(ENTRY_PREFIX)?;
        for key in &keys {
            self.storage.remove(key)?;
        }
        Ok(keys.len())
    }

    // == Sweep ==
    /// Removes every entry whose TTL has elapsed.
    pub fn sweep(&self) -> Result<usize, StorageError> {
        self.sweep_at(current_timestamp_ms())
    }

    /// Like [`sweep`](Self::sweep), evaluated at `now_ms`.
    ///
    /// Malformed entries can never be served and are removed as well.
    pub fn sweep_at(&self, now_ms: u64) -> Result<usize, StorageError> {
        let ttl = self.ttl();
        let _guard = self.io.lock();

        let mut removed = 0;
        for key in self.storage.keys_with_prefix(ENTRY_PREFIX)? {
            let Some(raw) = self.storage.get(&key)? else {
                continue;
            };
            let expired = match CacheEntry::decode(&raw) {
                Some(entry) => entry.is_expired_at(ttl, now_ms),
                None => true,
            };
            if expired {
                self.storage.remove(&key)?;
                removed += 1;
            }
        }

        self.stats.lock().record_evictions(removed);
        Ok(removed)
    }

    // == Length ==
    /// Number of entries currently held, valid or not.
    pub fn len(&self) -> usize {
        self.storage
            .keys_with_prefix(ENTRY_PREFIX)
            .map(|keys| keys.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Stats ==
    /// Returns a snapshot of the activity counters.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.lock().clone();
        stats.set_total_entries(self.len());
        stats
    }

    fn discard(&self, key: &str) {
        if let Err(e) = self.storage.remove(key) {
            warn!("Failed to remove cache entry {}: {}", key, e);
        }
    }
}

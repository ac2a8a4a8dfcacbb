//! Cache Context Module
//!
//! [`HttpCache`] bundles the registry, the store and the sweep timer of one
//! storage scope. Independent contexts can live side by side in a process.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::cache::{
    CacheStats, CacheStore, Method, MethodSpec, ServiceCacheConfig, ServiceRegistry,
};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::proxy::{RequestOptions, Response};
use crate::storage::{MemoryStorage, Storage};
use crate::tasks::Sweeper;

// == Http Cache ==
/// A cache context over one storage medium.
pub struct HttpCache {
    registry: ServiceRegistry,
    store: Arc<CacheStore>,
    sweeper: Sweeper,
}

impl HttpCache {
    // == Constructors ==
    /// Creates a context over `storage`. The sweep timer is not started;
    /// call [`start_sweeper`](Self::start_sweeper) from within a runtime.
    pub fn new(storage: Arc<dyn Storage>, config: CacheConfig) -> Self {
        let store = Arc::new(CacheStore::new(storage.clone(), config.ttl));
        Self {
            registry: ServiceRegistry::new(storage),
            sweeper: Sweeper::new(store.clone(), config.sweep_interval),
            store,
        }
    }

    /// Creates a context over a fresh, unlimited [`MemoryStorage`].
    pub fn in_memory(config: CacheConfig) -> Self {
        Self::new(Arc::new(MemoryStorage::new()), config)
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    // == Configuration ==
    pub fn config(&self) -> CacheConfig {
        CacheConfig::new(self.store.ttl(), self.sweeper.interval())
    }

    /// Changes the entry TTL for every later lookup and sweep.
    pub fn set_ttl(&self, ttl: Duration) {
        self.store.set_ttl(ttl);
        info!("Cache TTL set to {:?}", ttl);
    }

    /// Changes the sweep period, restarting the sweep timer if it runs.
    pub fn set_sweep_interval(&self, interval: Duration) -> Result<()> {
        self.sweeper.set_interval(interval)
    }

    pub fn start_sweeper(&self) -> Result<()> {
        self.sweeper.start()
    }

    pub fn stop_sweeper(&self) {
        self.sweeper.stop();
    }

    pub fn is_sweeping(&self) -> bool {
        self.sweeper.is_running()
    }

    // == Registration ==
    /// Marks every method of `url` cacheable.
    pub fn register_all(&self, url: &str) -> Result<ServiceCacheConfig> {
        Ok(self.registry.register_all(url)?)
    }

    /// Marks the given methods of `url` cacheable, skipping unknown ones.
    pub fn register<I>(&self, url: &str, methods: I) -> Result<ServiceCacheConfig>
    where
        I: IntoIterator,
        I::Item: Into<MethodSpec>,
    {
        Ok(self.registry.register(url, methods)?)
    }

    pub fn is_cacheable(&self, url: &str, method: impl Into<MethodSpec>) -> bool {
        self.registry.is_cacheable(url, method)
    }

    // == Lookup / Store ==
    /// Looks `key` up unless the options ask to bypass the cache.
    pub fn lookup(&self, key: &str, options: &RequestOptions) -> Option<Response> {
        if options.bypasses_cache() {
            return None;
        }
        self.store.lookup(key)
    }

    /// Stores a fresh response if `url`/`method` is registered and the
    /// options do not suppress the write.
    ///
    /// Storage failures are logged and swallowed. Returns whether the
    /// response was written.
    pub fn cache_response(
        &self,
        key: &str,
        url: &str,
        method: Method,
        response: &Response,
        options: &RequestOptions,
    ) -> bool {
        if options.suppresses_store() || !self.registry.is_cacheable(url, method) {
            return false;
        }
        match self.store.store(key, response.clone()) {
            Ok(()) => true,
            Err(e) => {
                warn!("Could not cache response for {} {}: {}", method, url, e);
                false
            }
        }
    }

    // == Flush ==
    /// Removes every cached response; registrations are kept.
    pub fn flush(&self) -> Result<usize> {
        let removed = self.store.flush()?;
        info!("Flushed {} cache entries", removed);
        Ok(removed)
    }

    /// Removes every registration; cached responses are kept.
    pub fn flush_services(&self) -> Result<usize> {
        Ok(self.registry.flush()?)
    }

    /// Runs one sweep immediately.
    pub fn sweep(&self) -> Result<usize> {
        Ok(self.store.sweep()?)
    }

    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }
}

impl Default for HttpCache {
    fn default() -> Self {
        Self::in_memory(CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::derive_key;

    const URL: &str = "http://www.mock.com/test-service-one";

    fn key() -> String {
        derive_key(Method::Get, URL, None).unwrap()
    }

    #[test]
    fn test_flush_keeps_registrations() {
        let cache = HttpCache::default();
        cache.register_all(URL).unwrap();
        cache.store().store(&key(), Response::new(200, "a")).unwrap();

        assert_eq!(cache.flush().unwrap(), 1);
        assert!(cache.store().is_empty());
        assert!(cache.is_cacheable(URL, Method::Get));
    }

    #[test]
    fn test_flush_services_keeps_entries() {
        let cache = HttpCache::default();
        cache.register_all(URL).unwrap();
        cache.store().store(&key(), Response::new(200, "a")).unwrap();

        assert_eq!(cache.flush_services().unwrap(), 1);
        assert!(!cache.is_cacheable(URL, Method::Get));
        assert_eq!(cache.store().len(), 1);
    }

    #[test]
    fn test_lookup_bypass() {
        let cache = HttpCache::default();
        cache.store().store(&key(), Response::new(200, "a")).unwrap();

        let bypass = RequestOptions::new().do_not_use_cached_response(true);
        assert!(cache.lookup(&key(), &bypass).is_none());
        assert!(cache.lookup(&key(), &RequestOptions::new()).is_some());
    }

    #[test]
    fn test_cache_response_honours_registry_and_flag() {
        let cache = HttpCache::default();
        let response = Response::new(200, "a");
        let options = RequestOptions::new();

        assert!(!cache.cache_response(&key(), URL, Method::Get, &response, &options));

        cache.register(URL, ["get"]).unwrap();
        let suppress = RequestOptions::new().do_not_cache_response(true);
        assert!(!cache.cache_response(&key(), URL, Method::Get, &response, &suppress));
        assert!(cache.cache_response(&key(), URL, Method::Get, &response, &options));
    }

    #[test]
    fn test_cache_response_swallows_storage_failure() {
        let storage = Arc::new(MemoryStorage::with_quota(200));
        let cache = HttpCache::new(storage, CacheConfig::default());
        cache.register_all(URL).unwrap();

        let big = Response::new(200, vec![b'x'; 1024]);
        assert!(!cache.cache_response(&key(), URL, Method::Get, &big, &RequestOptions::new()));
        assert_eq!(cache.stats().store_failures, 1);
    }

    #[test]
    fn test_contexts_are_independent() {
        let a = HttpCache::default();
        let b = HttpCache::default();
        a.register_all(URL).unwrap();

        assert!(a.is_cacheable(URL, Method::Get));
        assert!(!b.is_cacheable(URL, Method::Get));
    }

    #[test]
    fn test_set_ttl_is_reflected_in_config() {
        let cache = HttpCache::default();
        cache.set_ttl(Duration::from_secs(10));
        assert_eq!(cache.config().ttl, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_sweeper_lifecycle() {
        let cache = HttpCache::default();
        cache.start_sweeper().unwrap();
        assert!(cache.is_sweeping());

        cache.set_sweep_interval(Duration::from_millis(20)).unwrap();
        assert_eq!(cache.config().sweep_interval, Duration::from_millis(20));
        assert!(cache.is_sweeping());

        cache.stop_sweeper();
        assert!(!cache.is_sweeping());
    }
}

//! Cacheability Registry Module
//!
//! Records, per endpoint URL, which methods may have their responses cached.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::method::{Method, MethodSet, MethodSpec};
use crate::storage::{Storage, StorageError};

/// Storage prefix shared by every service registration key.
pub const SERVICE_PREFIX: &str = "http_cache.service.";

// == Service Cache Config ==
/// Persisted registration for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCacheConfig {
    pub url: String,
    pub method_mask: MethodSet,
}

impl ServiceCacheConfig {
    pub fn allows(&self, method: Method) -> bool {
        self.method_mask.contains(method)
    }
}

// == Service Registry ==
/// Registry of cacheable endpoints, persisted in a [`Storage`] medium.
///
/// Registration only ever adds methods: a later call for the same URL is
/// OR-merged into the existing mask.
pub struct ServiceRegistry {
    storage: Arc<dyn Storage>,
    /// Serializes read-modify-write cycles on registrations
    lock: Mutex<()>,
}

impl ServiceRegistry {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            lock: Mutex::new(()),
        }
    }

    // == Register ==
    /// Marks every method cacheable for `url`.
    pub fn register_all(&self, url: &str) -> Result<ServiceCacheConfig, StorageError> {
        self.merge(url, MethodSet::all())
    }

    /// Marks the given methods cacheable for `url`.
    ///
    /// Entries that do not resolve to a known method are skipped; the rest
    /// of the list is still applied.
    pub fn register<I>(&self, url: &str, methods: I) -> Result<ServiceCacheConfig, StorageError>
    where
        I: IntoIterator,
        I::Item: Into<MethodSpec>,
    {
        let mut mask = MethodSet::empty();
        for spec in methods {
            let spec = spec.into();
            match Method::resolve(&spec) {
                Some(method) => mask.insert(method),
                None => debug!("Skipping unknown method '{}' for {}", spec, url),
            }
        }
        self.merge(url, mask)
    }

    fn merge(&self, url: &str, mask: MethodSet) -> Result<ServiceCacheConfig, StorageError> {
        let _guard = self.lock.lock();

        let method_mask = match self.read(url)? {
            Some(existing) => existing.method_mask.union(mask),
            None => mask,
        };
        let config = ServiceCacheConfig {
            url: url.to_string(),
            method_mask,
        };

        let raw = serde_json::to_string(&config)
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        self.storage.set(&service_key(url), raw)?;

        info!(
            "Registered cacheable service {} for [{}]",
            url,
            method_mask
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(config)
    }

    // == Lookup ==
    /// Returns the registration for `url`, if any.
    pub fn service(&self, url: &str) -> Option<ServiceCacheConfig> {
        match self.read(url) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to read registration for {}: {}", url, e);
                None
            }
        }
    }

    /// Checks whether responses to `method` requests on `url` may be cached.
    pub fn is_cacheable(&self, url: &str, method: impl Into<MethodSpec>) -> bool {
        let Some(method) = Method::resolve(method) else {
            return false;
        };
        self.service(url).is_some_and(|config| config.allows(method))
    }

    /// Lists every registration.
    pub fn services(&self) -> Result<Vec<ServiceCacheConfig>, StorageError> {
        let mut services: Vec<ServiceCacheConfig> = self
            .storage
            .keys_with_prefix(SERVICE_PREFIX)?
            .iter()
            .filter_map(|key| self.storage.get(key).ok().flatten())
            .filter_map(|raw| serde_json::from_str(&raw).ok())
            .collect();
        services.sort_by(|a, b| a.url.cmp(&b.url));
        Ok(services)
    }

    // == Flush ==
    /// Removes every registration. Cache entries are untouched.
    ///
    /// Returns the number of registrations removed.
    pub fn flush(&self) -> Result<usize, StorageError> {
        let _guard = self.lock.lock();

        let keys = self.storage.keys_with_prefix(SERVICE_PREFIX)?;
        for key in &keys {
            self.storage.remove(key)?;
        }

        info!("Flushed {} service registrations", keys.len());
        Ok(keys.len())
    }

    /// Reads a registration; a malformed record counts as absent.
    fn read(&self, url: &str) -> Result<Option<ServiceCacheConfig>, StorageError> {
        let Some(raw) = self.storage.get(&service_key(url))? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(config) => Ok(Some(config)),
            Err(e) => {
                warn!("Ignoring malformed registration for {}: {}", url, e);
                Ok(None)
            }
        }
    }
}

fn service_key(url: &str) -> String {
    format!("{}{}", SERVICE_PREFIX, url)
}

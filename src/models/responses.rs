//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheStats, ServiceCacheConfig};
use crate::config::CacheConfig;
use crate::proxy::Response;

/// A service registration (POST /services, GET /services)
#[derive(Debug, Clone, Serialize)]
pub struct ServiceResponse {
    /// The endpoint URL
    pub url: String,
    /// Cacheable verbs
    pub methods: Vec<String>,
}

impl From<ServiceCacheConfig> for ServiceResponse {
    fn from(config: ServiceCacheConfig) -> Self {
        Self {
            methods: config
                .method_mask
                .iter()
                .map(|m| m.as_str().to_string())
                .collect(),
            url: config.url,
        }
    }
}

/// Response body for GET /services/cacheable
#[derive(Debug, Clone, Serialize)]
pub struct CacheableResponse {
    pub url: String,
    pub method: String,
    pub cacheable: bool,
}

/// Response body for DELETE /cache and DELETE /services
#[derive(Debug, Clone, Serialize)]
pub struct FlushResponse {
    /// Success message
    pub message: String,
    /// Number of records removed
    pub removed: usize,
}

impl FlushResponse {
    pub fn new(what: &str, removed: usize) -> Self {
        Self {
            message: format!("Flushed {} {}", removed, what),
            removed,
        }
    }
}

/// Response body for GET/PUT /config
#[derive(Debug, Clone, Serialize)]
pub struct ConfigResponse {
    pub ttl_secs: u64,
    pub sweep_interval_ms: u64,
}

impl From<CacheConfig> for ConfigResponse {
    fn from(config: CacheConfig) -> Self {
        Self {
            ttl_secs: config.ttl.as_secs(),
            sweep_interval_ms: u64::try_from(config.sweep_interval.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Response body for POST /fetch
#[derive(Debug, Clone, Serialize)]
pub struct FetchResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8
    pub body: String,
    pub url: String,
}

impl From<Response> for FetchResponse {
    fn from(response: Response) -> Self {
        Self {
            status: response.status,
            body: response.text(),
            headers: response.headers,
            url: response.url,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of responses written
    pub stores: u64,
    /// Number of rejected writes
    pub store_failures: u64,
    /// Number of TTL evictions
    pub evictions: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            stores: stats.stores,
            store_failures: stats.store_failures,
            evictions: stats.evictions,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Whether the TTL sweep task is running
    pub sweeping: bool,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(sweeping: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            sweeping,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

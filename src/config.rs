//! Configuration Module
//!
//! Cache timing parameters and the server configuration loaded from
//! environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default entry lifetime: one hour
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Default period between sweeps: five seconds
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5);

// == Cache Config ==
/// Timing parameters of a cache context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long an entry stays valid after it is written
    pub ttl: Duration,
    /// Period of the background sweep
    pub sweep_interval: Duration,
}

impl CacheConfig {
    pub fn new(ttl: Duration, sweep_interval: Duration) -> Self {
        Self {
            ttl,
            sweep_interval,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_SWEEP_INTERVAL)
    }
}

// == Server Config ==
/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache timing
    pub cache: CacheConfig,
    /// HTTP server port
    pub server_port: u16,
    /// Timeout for upstream requests in seconds
    pub upstream_timeout: u64,
    /// Byte limit of the storage medium, None = unlimited
    pub storage_quota: Option<usize>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL_SECS` - Entry TTL in seconds (default: 3600)
    /// - `SWEEP_INTERVAL_MS` - Sweep period in milliseconds (default: 5000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `UPSTREAM_TIMEOUT_SECS` - Upstream request timeout (default: 30)
    /// - `STORAGE_QUOTA_BYTES` - Storage byte limit (default: unlimited)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache: CacheConfig {
                ttl: env_parse::<u64>("CACHE_TTL_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.cache.ttl),
                sweep_interval: env_parse::<u64>("SWEEP_INTERVAL_MS")
                    .filter(|ms| *ms > 0)
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.cache.sweep_interval),
            },
            server_port: env_parse("SERVER_PORT").unwrap_or(defaults.server_port),
            upstream_timeout: env_parse("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or(defaults.upstream_timeout),
            storage_quota: env_parse("STORAGE_QUOTA_BYTES"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            server_port: 3000,
            upstream_timeout: 30,
            storage_quota: None,
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

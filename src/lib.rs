//! HTTP Cache Proxy - A transparent response cache for HTTP clients
//!
//! Short-circuits requests to endpoints that opted in to caching, keyed by
//! method, URL and body, with TTL expiration and background sweeping.

pub mod api;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod proxy;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use cache::{Method, RequestBody};
pub use config::{CacheConfig, Config};
pub use context::HttpCache;
pub use error::{CacheError, Result};
pub use proxy::{CacheProxy, ReqwestTransport, RequestOptions, Response, Transport};
pub use storage::{MemoryStorage, Storage};

//! API Module
//!
//! HTTP handlers and routing for the admin/sidecar REST API.
//!
//! # Endpoints
//! - `POST|GET|DELETE /services` - Register, list or clear cacheable endpoints
//! - `GET /services/cacheable` - Query cacheability
//! - `DELETE /cache` - Clear cached responses
//! - `GET|PUT /config` - Cache timing
//! - `POST /fetch` - Proxy a request through the cache
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;

//! API Handlers
//!
//! HTTP request handlers for each admin endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::info;

use crate::context::HttpCache;
use crate::error::{CacheError, Result};
use crate::models::{
    CacheableQuery, CacheableResponse, ConfigRequest, ConfigResponse, FetchRequest,
    FetchResponse, FlushResponse, HealthResponse, RegisterRequest, ServiceResponse,
    StatsResponse,
};
use crate::proxy::{CacheProxy, Transport};

/// Application state shared across all handlers.
///
/// Holds the caching proxy; the cache context is reachable through it.
pub struct AppState<T: Transport> {
    pub proxy: Arc<CacheProxy<T>>,
}

impl<T: Transport> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            proxy: self.proxy.clone(),
        }
    }
}

impl<T: Transport> AppState<T> {
    pub fn new(proxy: CacheProxy<T>) -> Self {
        Self {
            proxy: Arc::new(proxy),
        }
    }

    pub fn cache(&self) -> &HttpCache {
        self.proxy.cache()
    }
}

/// Handler for POST /services
///
/// Registers an endpoint as cacheable, for all methods or the listed ones.
pub async fn register_handler<T: Transport>(
    State(state): State<AppState<T>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ServiceResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let config = match req.methods {
        Some(methods) => state.cache().register(&req.url, methods)?,
        None => state.cache().register_all(&req.url)?,
    };

    Ok(Json(ServiceResponse::from(config)))
}

/// Handler for GET /services
pub async fn list_services_handler<T: Transport>(
    State(state): State<AppState<T>>,
) -> Result<Json<Vec<ServiceResponse>>> {
    let services = state.cache().registry().services()?;
    Ok(Json(services.into_iter().map(ServiceResponse::from).collect()))
}

/// Handler for GET /services/cacheable?url=..&method=..
pub async fn cacheable_handler<T: Transport>(
    State(state): State<AppState<T>>,
    Query(query): Query<CacheableQuery>,
) -> Json<CacheableResponse> {
    let cacheable = state.cache().is_cacheable(&query.url, query.method.as_str());
    Json(CacheableResponse {
        url: query.url,
        method: query.method,
        cacheable,
    })
}

/// Handler for DELETE /services
///
/// Clears the registry; cached responses are kept.
pub async fn flush_services_handler<T: Transport>(
    State(state): State<AppState<T>>,
) -> Result<Json<FlushResponse>> {
    let removed = state.cache().flush_services()?;
    Ok(Json(FlushResponse::new("service registrations", removed)))
}

/// Handler for DELETE /cache
///
/// Clears cached responses; registrations are kept.
pub async fn flush_cache_handler<T: Transport>(
    State(state): State<AppState<T>>,
) -> Result<Json<FlushResponse>> {
    let removed = state.cache().flush()?;
    Ok(Json(FlushResponse::new("cache entries", removed)))
}

/// Handler for GET /config
pub async fn get_config_handler<T: Transport>(
    State(state): State<AppState<T>>,
) -> Json<ConfigResponse> {
    Json(ConfigResponse::from(state.cache().config()))
}

/// Handler for PUT /config
///
/// Updates the TTL and/or the sweep interval. A new interval restarts the
/// sweep task.
pub async fn put_config_handler<T: Transport>(
    State(state): State<AppState<T>>,
    Json(req): Json<ConfigRequest>,
) -> Result<Json<ConfigResponse>> {
    if let Some(ms) = req.sweep_interval_ms {
        state
            .cache()
            .set_sweep_interval(Duration::from_millis(ms))?;
    }
    if let Some(secs) = req.ttl_secs {
        state.cache().set_ttl(Duration::from_secs(secs));
    }

    let config = state.cache().config();
    info!("Cache reconfigured: {:?}", config);
    Ok(Json(ConfigResponse::from(config)))
}

/// Handler for POST /fetch
///
/// Sends a request upstream through the cache proxy.
pub async fn fetch_handler<T: Transport>(
    State(state): State<AppState<T>>,
    Json(req): Json<FetchRequest>,
) -> Result<Json<FetchResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let response = state.proxy.request(&req.url, req.options()).await?;
    Ok(Json(FetchResponse::from(response)))
}

/// Handler for GET /stats
pub async fn stats_handler<T: Transport>(State(state): State<AppState<T>>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache().stats()))
}

/// Handler for GET /health
pub async fn health_handler<T: Transport>(
    State(state): State<AppState<T>>,
) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.cache().is_sweeping()))
}

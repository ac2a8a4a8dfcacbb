//! API Routes
//!
//! Configures the Axum router with all admin endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cacheable_handler, fetch_handler, flush_cache_handler, flush_services_handler,
    get_config_handler, health_handler, list_services_handler, put_config_handler,
    register_handler, stats_handler, AppState,
};
use crate::proxy::Transport;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /services` - Register a cacheable endpoint
/// - `GET /services` - List registrations
/// - `DELETE /services` - Clear registrations
/// - `GET /services/cacheable` - Query cacheability of a URL/method
/// - `DELETE /cache` - Clear cached responses
/// - `GET|PUT /config` - Read or change TTL and sweep interval
/// - `POST /fetch` - Send a request upstream through the cache
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router<T: Transport>(state: AppState<T>) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/services",
            post(register_handler::<T>)
                .get(list_services_handler::<T>)
                .delete(flush_services_handler::<T>),
        )
        .route("/services/cacheable", get(cacheable_handler::<T>))
        .route("/cache", delete(flush_cache_handler::<T>))
        .route(
            "/config",
            get(get_config_handler::<T>).put(put_config_handler::<T>),
        )
        .route("/fetch", post(fetch_handler::<T>))
        .route("/stats", get(stats_handler::<T>))
        .route("/health", get(health_handler::<T>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::HttpCache;
    use crate::proxy::{CacheProxy, ReqwestTransport};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let transport = ReqwestTransport::new(Duration::from_secs(1)).unwrap();
        let proxy = CacheProxy::new(transport, Arc::new(HttpCache::default()));
        create_router(AppState::new(proxy))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_register_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/services")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"url":"http://a.com/x","methods":["get"]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_flush_cache_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/cache")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_fetch_unknown_method_is_bad_request() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/fetch")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"method":"somethingbad","url":"http://a.com/x"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

//! HTTP Cache Proxy - sidecar server
//!
//! Runs the cache in front of a reqwest transport and exposes the admin API.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use http_cache_proxy::api::create_router;
use http_cache_proxy::{AppState, CacheProxy, Config, HttpCache, MemoryStorage, ReqwestTransport};

/// Main entry point for the cache proxy server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache context over the storage medium
/// 4. Start the background TTL sweep task
/// 5. Create the upstream transport and caching proxy
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "http_cache_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HTTP Cache Proxy");

    let config = Config::from_env();
    info!(
        "Configuration loaded: ttl={:?}, sweep_interval={:?}, port={}, upstream_timeout={}s, storage_quota={:?}",
        config.cache.ttl,
        config.cache.sweep_interval,
        config.server_port,
        config.upstream_timeout,
        config.storage_quota
    );

    let storage = match config.storage_quota {
        Some(quota) => MemoryStorage::with_quota(quota),
        None => MemoryStorage::new(),
    };
    let cache = Arc::new(HttpCache::new(Arc::new(storage), config.cache));
    cache.start_sweeper()?;
    info!("Cache initialized, sweep task started");

    let transport = ReqwestTransport::new(Duration::from_secs(config.upstream_timeout))
        .context("failed to build upstream HTTP client")?;
    let state = AppState::new(CacheProxy::new(transport, cache.clone()));
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    cache.stop_sweeper();
    info!("Sweep task stopped");
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}

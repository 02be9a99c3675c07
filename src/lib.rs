//! IIIF Image API 3.0 server core: request parsing, source resolution, a
//! two-tier cache, and a fixed transformation pipeline.
//!
//! A `router()` + `State<Arc<AppState>>` shape wires the IIIF-grammar
//! routes alongside operational endpoints — see DESIGN.md for the
//! per-module grounding ledger.

pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod info;
pub mod metrics;
pub mod pipeline;
pub mod request;
pub mod source;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::services::ServeDir;

use crate::cache::{cache_control_middleware, spawn_eviction_job, PrimaryStore, RedisStore, TieredCache};
use crate::config::ServerConfig;
use crate::handlers::{health_handler, iiif_handler, metrics_handler, status_handler, AppState};
use crate::source::{LocalFsSource, MinioSource, SourceBackend};

/// Builds the `SourceBackend` the router will fetch through, per
/// `config.read_minio`.
fn build_source(config: &ServerConfig) -> Result<Arc<dyn SourceBackend>, error::IiifError> {
    if config.read_minio {
        Ok(Arc::new(MinioSource::new(&config.minio)?))
    } else {
        Ok(Arc::new(LocalFsSource::new(config.image_dir.clone())))
    }
}

/// Assembles the router's shared state: config, tiered cache, source
/// backend, and metrics. Also spawns the periodic sentinel eviction job.
pub async fn build_state(
    config: ServerConfig,
    primary: Arc<dyn PrimaryStore>,
) -> Result<Arc<AppState>, error::IiifError> {
    let source = build_source(&config)?;
    let cache = TieredCache::new(primary, config.cache_dir.clone(), crate::cache::DEFAULT_TTL_SECONDS);

    let sentinel = cache.sentinel_store();
    spawn_eviction_job(sentinel, config.eviction_batch_size);

    Ok(Arc::new(AppState {
        config,
        cache,
        source,
        metrics: metrics::Metrics::new(),
    }))
}

/// Connects to Redis and builds a full `AppState` behind it — the
/// production entry point used by `main.rs`.
pub async fn build_state_with_redis(config: ServerConfig) -> Result<Arc<AppState>, error::IiifError> {
    let redis = RedisStore::connect(&config.redis, crate::cache::DEFAULT_TTL_SECONDS).await?;
    build_state(config, Arc::new(redis)).await
}

/// Wires the image/info routes plus thin `/health`, `/status`, `/metrics`
/// endpoints and a `ServeDir` nest for any static assets sitting alongside
/// the API.
pub fn router(state: Arc<AppState>) -> Router {
    // `version` is a configured label used only for URL-prefix matching —
    // baked into the route pattern rather than bound as a dynamic
    // parameter, since requests under any other prefix simply don't match
    // this server's API surface at all.
    let iiif_prefix = format!("/iiif/{}/*path", state.config.version);

    Router::new()
        .route(&iiif_prefix, get(iiif_handler))
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/metrics", get(metrics_handler))
        .nest_service("/", ServeDir::new("static"))
        .layer(axum::middleware::from_fn(cache_control_middleware))
        .with_state(state)
}

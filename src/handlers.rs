//! HTTP handlers: the IIIF image/info routes plus operational endpoints
//! (`/health`, `/status`, `/`).
//!
//! A `State<Arc<AppState>>` extractor, `impl IntoResponse` return types,
//! and `spawn_blocking` around the CPU-bound transform step so decode/
//! resize/encode work doesn't block the async runtime's worker threads.

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::cache::TieredCache;
use crate::config::ServerConfig;
use crate::error::IiifError;
use crate::info::{build_id, InfoDescriptor};
use crate::metrics::Metrics;
use crate::pipeline;
use crate::request::{self, ImageRequest};
use crate::source::SourceBackend;

pub struct AppState {
    pub config: ServerConfig,
    pub cache: TieredCache,
    pub source: Arc<dyn SourceBackend>,
    pub metrics: Metrics,
}

/// Dispatches both routes off a single wildcard capture, since the last
/// path segment decides info-vs-image.
///
/// Reads the still-percent-encoded tail straight off the request URI rather
/// than binding axum's `Path<String>` extractor, which percent-decodes the
/// captured segment itself — binding it here would decode the path twice
/// before `request::parse_path` ever sees it, violating the "URL-decode
/// once" contract of spec.md §4.1.
pub async fn iiif_handler(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let prefix = format!("/iiif/{}/", state.config.version);
    let raw_path = uri.path().strip_prefix(prefix.as_str()).unwrap_or("");

    match request::parse_path(raw_path) {
        Ok(ImageRequest::Info { identifier }) => info_response(state, identifier).await,
        Ok(ImageRequest::Image(params)) => image_response(state, params).await,
        Err(e) => {
            state.metrics.errors.inc();
            e.into_response()
        }
    }
}

async fn load_source_bytes(state: &Arc<AppState>, identifier: &str) -> Result<Vec<u8>, IiifError> {
    let source = state.source.clone();
    let id = identifier.to_string();
    let hit_before = state.cache.sentinel_store().exists(&crate::cache::key_for(identifier)).await;

    let bytes = state
        .cache
        .get_or_load(identifier, || async move { source.fetch(&id).await })
        .await?;

    if hit_before {
        state.metrics.cache_hits.inc();
    } else {
        state.metrics.cache_misses.inc();
    }
    Ok(bytes)
}

async fn info_response(state: Arc<AppState>, identifier: String) -> Response {
    let bytes = match load_source_bytes(&state, &identifier).await {
        Ok(b) => b,
        Err(e) => {
            state.metrics.errors.inc();
            return e.into_response();
        }
    };

    let dims = tokio::task::spawn_blocking(move || {
        use image::GenericImageView;
        let fmt = image::guess_format(&bytes)
            .map_err(|e| IiifError::InternalServerError(format!("unrecognised image data: {e}")))?;
        let img = image::load_from_memory_with_format(&bytes, fmt)
            .map_err(|e| IiifError::InternalServerError(format!("failed to decode image: {e}")))?;
        Ok::<(u32, u32), IiifError>(img.dimensions())
    })
    .await
    .unwrap_or_else(|e| Err(IiifError::InternalServerError(format!("decode task panicked: {e}"))));

    match dims {
        Ok((w, h)) => {
            let scheme = if state.config.enable_https { "https" } else { "http" };
            let id = build_id(scheme, &state.config.host, state.config.port, &state.config.version, &identifier);
            Json(InfoDescriptor::new(id, w, h)).into_response()
        }
        Err(e) => {
            state.metrics.errors.inc();
            e.into_response()
        }
    }
}

async fn image_response(state: Arc<AppState>, params: request::ImageParams) -> Response {
    let bytes = match load_source_bytes(&state, &params.identifier).await {
        Ok(b) => b,
        Err(e) => {
            state.metrics.errors.inc();
            return e.into_response();
        }
    };

    let max_pixels = state.config.max_pixels;
    let metrics_transforms = &state.metrics.transforms;

    let result = tokio::task::spawn_blocking(move || pipeline::transform(&bytes, &params, max_pixels))
        .await
        .unwrap_or_else(|e| Err(IiifError::InternalServerError(format!("transform task panicked: {e}"))));

    match result {
        Ok(transformed) => {
            metrics_transforms.inc();
            let mut response = (StatusCode::OK, transformed.bytes).into_response();
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(transformed.content_type),
            );
            response
        }
        Err(e) => {
            state.metrics.errors.inc();
            e.into_response()
        }
    }
}

pub async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "time": time::OffsetDateTime::now_utc().unix_timestamp(),
    }))
}

pub async fn status_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "cache": {
            "hits": state.metrics.cache_hits.get(),
            "misses": state.metrics.cache_misses.get(),
            "hit_rate_percent": state.metrics.hit_rate_percent(),
        },
        "transforms": {
            "total": state.metrics.transforms.get(),
            "errors": state.metrics.errors.get(),
        },
        "version": state.config.version,
    }))
}

pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("Content-Type", "text/plain; version=0.0.4")],
        state.metrics.encode(),
    )
}

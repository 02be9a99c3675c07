use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use iiif_serve::build_state;
use iiif_serve::cache::PrimaryStore;
use iiif_serve::config::ServerConfig;
use iiif_serve::error::IiifError;
use iiif_serve::router;
use serde_json::Value;
use tower::util::ServiceExt;

#[derive(Default)]
struct FakePrimary {
    data: StdMutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl PrimaryStore for FakePrimary {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, IiifError> {
        Ok(self.data.lock().unwrap().get(key).cloned())
    }
    async fn set(&self, key: &str, bytes: &[u8], _ttl: u64) -> Result<(), IiifError> {
        self.data.lock().unwrap().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

fn encode_png(w: u32, h: u32) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(w, h));
    let mut out = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

async fn test_app() -> (axum::Router, tempfile::TempDir, tempfile::TempDir) {
    let image_dir = tempfile::tempdir().unwrap();
    let cache_dir = tempfile::tempdir().unwrap();

    std::fs::write(image_dir.path().join("demo.jpg"), encode_png(2000, 1000)).unwrap();

    let mut config = ServerConfig::default();
    config.image_dir = image_dir.path().to_path_buf();
    config.cache_dir = cache_dir.path().to_path_buf();
    config.max_pixels = 10_000_000;
    config.version = "v3".to_string();

    let state = build_state(config, Arc::new(FakePrimary::default()))
        .await
        .unwrap();
    (router(state), image_dir, cache_dir)
}

#[tokio::test]
async fn full_region_image_request_returns_png() {
    let (app, _img, _cache) = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/iiif/v3/demo.jpg/full/max/0/default.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "image/png");
}

#[tokio::test]
async fn info_json_reports_dimensions() {
    let (app, _img, _cache) = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/iiif/v3/demo.jpg/info.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["width"], 2000);
    assert_eq!(json["height"], 1000);
    assert_eq!(json["type"], "sc:Manifest");
}

#[tokio::test]
async fn missing_identifier_is_404_with_not_found_code() {
    let (app, _img, _cache) = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/iiif/v3/missing.jpg/info.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"]["code"], "NotFound");
}

#[tokio::test]
async fn unsupported_rotation_is_400() {
    let (app, _img, _cache) = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/iiif/v3/demo.jpg/full/max/45/default.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"]["code"], "RotationUnsupported");
}

#[tokio::test]
async fn region_exceeding_bounds_is_400_invalid_region() {
    let (app, _img, _cache) = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/iiif/v3/demo.jpg/1900,900,500,500/max/0/default.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"]["code"], "InvalidRegion");
}

#[tokio::test]
async fn health_and_status_endpoints_respond() {
    let (app, _img, _cache) = test_app().await;

    let health = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);

    let status = app
        .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(status.status(), StatusCode::OK);
}

#[tokio::test]
async fn repeated_request_is_served_from_cache() {
    let (app, _img, cache_dir) = test_app().await;

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/iiif/v3/demo.jpg/square/!300,300/0/gray.png")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let sentinel_count = std::fs::read_dir(cache_dir.path()).unwrap().count();
    assert_eq!(sentinel_count, 1, "one sentinel file per cached identifier");
}

#[tokio::test]
async fn router_decodes_percent_encoded_identifier_exactly_once() {
    // Regression test for double-decoding: if the router's wildcard capture
    // were bound with axum's `Path<String>` extractor (which percent-decodes
    // the segment itself), "%2520" would already have become "100%.jpg"
    // before `request::parse_path` ran its own decode pass, and re-decoding
    // "100%.jpg" would fail ("%.j" isn't a valid percent-escape). Reading the
    // raw URI instead means the identifier is decoded exactly once.
    let (app, image_dir, _cache) = test_app().await;
    std::fs::write(image_dir.path().join("100%.jpg"), encode_png(10, 10)).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/iiif/v3/100%25.jpg/full/max/0/default.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

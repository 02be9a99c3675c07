use iiif_serve::config::ServerConfig;
use iiif_serve::{build_state_with_redis, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "iiif_serve=info,tower_http=info".into()),
        )
        .init();

    let config = config_from_env();
    config.validate()?;

    tracing::info!(port = config.port, version = %config.version, "starting IIIF image server");

    let state = build_state_with_redis(config.clone()).await?;
    let app = router(state);

    let addr = std::net::SocketAddr::from((
        config
            .host
            .parse::<std::net::IpAddr>()
            .unwrap_or(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)),
        config.port,
    ));
    tracing::info!("listening on {addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}

/// Builds a `ServerConfig` from environment variables, falling back to
/// `ServerConfig::default()` for anything unset. YAML-file loading is an
/// out-of-scope seam (SPEC_FULL.md §6.1) — this is a minimal env-based
/// loader sufficient to run the binary.
fn config_from_env() -> ServerConfig {
    let mut config = ServerConfig::default();

    if let Ok(dir) = std::env::var("IIIF_IMAGE_DIR") {
        config.image_dir = dir.into();
    }
    if let Ok(dir) = std::env::var("IIIF_CACHE_DIR") {
        config.cache_dir = dir.into();
    }
    if let Ok(host) = std::env::var("IIIF_HOST") {
        config.host = host;
    }
    if let Ok(port) = std::env::var("PORT").or_else(|_| std::env::var("IIIF_PORT")) {
        if let Ok(port) = port.parse() {
            config.port = port;
        }
    }
    if let Ok(max_pixels) = std::env::var("IIIF_MAX_PIXELS") {
        if let Ok(max_pixels) = max_pixels.parse() {
            config.max_pixels = max_pixels;
        }
    }
    if let Ok(version) = std::env::var("IIIF_VERSION") {
        config.version = version;
    }
    if let Ok(read_minio) = std::env::var("IIIF_READ_MINIO") {
        config.read_minio = read_minio == "true" || read_minio == "1";
    }
    if let Ok(endpoint) = std::env::var("IIIF_MINIO_ENDPOINT") {
        config.minio.endpoint = endpoint;
    }
    if let Ok(bucket) = std::env::var("IIIF_MINIO_BUCKET") {
        config.minio.bucket = bucket;
    }
    if let Ok(access_key) = std::env::var("IIIF_MINIO_ACCESS_KEY") {
        config.minio.access_key = access_key;
    }
    if let Ok(secret_key) = std::env::var("IIIF_MINIO_SECRET_KEY") {
        config.minio.secret_key = secret_key;
    }
    if let Ok(host) = std::env::var("IIIF_REDIS_HOST") {
        config.redis.host = host;
    }
    if let Ok(port) = std::env::var("IIIF_REDIS_PORT") {
        if let Ok(port) = port.parse() {
            config.redis.port = port;
        }
    }

    config
}

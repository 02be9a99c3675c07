use goose::prelude::*;
use rand::Rng;

/// Load testing suite for the IIIF image server.
///
/// Simulates realistic production traffic against the IIIF Image API 3.0
/// surface:
/// - `info.json` descriptor fetches (cheap, decode-only)
/// - Image transformation requests with varied region/size/rotation/quality
///   (cache-miss scenarios)
/// - Repeated identical requests (cache-hit scenarios)
/// - Health monitoring
///
/// # Usage
/// ```bash
/// cd loadtest
/// cargo run --release -- --host http://localhost:8080 --users 10 --hatch-rate 2 --run-time 60s
/// ```
const IDENTIFIERS: &[&str] = &["demo.jpg", "plate.tif", "manuscript.png"];
const VERSION: &str = "v3";

#[tokio::main]
async fn main() -> Result<(), GooseError> {
    GooseAttack::initialize()?
        .register_scenario(
            scenario!("ImageTransformation")
                .register_transaction(transaction!(info_json).set_weight(3)?)
                .register_transaction(transaction!(transform_image).set_weight(10)?)
                .register_transaction(transaction!(health_check).set_weight(1)?),
        )
        .register_scenario(
            scenario!("CachePerformance")
                .register_transaction(transaction!(cached_image).set_weight(15)?)
                .register_transaction(transaction!(uncached_image).set_weight(5)?),
        )
        .execute()
        .await?;

    Ok(())
}

fn random_identifier() -> &'static str {
    let mut rng = rand::thread_rng();
    IDENTIFIERS[rng.gen_range(0..IDENTIFIERS.len())]
}

/// `info.json` fetches exercise the Cache Layer and decode step without
/// the full transformation pipeline.
async fn info_json(user: &mut GooseUser) -> TransactionResult {
    let url = format!("/iiif/{VERSION}/{}/info.json", random_identifier());
    let _goose = user.get(&url).await?;
    Ok(())
}

/// Exercises the full Region/Size/Rotation/Quality/Format pipeline with
/// randomized parameters, distributing load across distinct cache keys.
async fn transform_image(user: &mut GooseUser) -> TransactionResult {
    let url = {
        let mut rng = rand::thread_rng();
        let side = rng.gen_range(200..800);
        let formats = ["jpg", "png", "webp"];
        let format = formats[rng.gen_range(0..formats.len())];
        let qualities = ["default", "gray", "bitonal"];
        let quality = qualities[rng.gen_range(0..qualities.len())];

        format!(
            "/iiif/{VERSION}/{}/full/{side},/0/{quality}.{format}",
            random_identifier()
        )
    };

    let _goose = user.get(&url).await?;
    Ok(())
}

/// Fixed parameters guarantee a cache hit after the first request warms it.
async fn cached_image(user: &mut GooseUser) -> TransactionResult {
    let url = format!("/iiif/{VERSION}/demo.jpg/square/!500,500/0/default.webp");
    let _goose = user.get(&url).await?;
    Ok(())
}

/// Timestamp-derived region guarantees a fresh cache key every call.
async fn uncached_image(user: &mut GooseUser) -> TransactionResult {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis();
    let x = (timestamp % 500) as u32;
    let url = format!("/iiif/{VERSION}/demo.jpg/{x},{x},400,400/max/0/default.webp");
    let _goose = user.get(&url).await?;
    Ok(())
}

async fn health_check(user: &mut GooseUser) -> TransactionResult {
    let _goose = user.get("/health").await?;
    Ok(())
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rusty_s3::{Bucket, Credentials, S3Action, UrlStyle};

use crate::config::MinioConfig;
use crate::error::IiifError;
use crate::source::{validate_image_bytes, SourceBackend};

/// Fetches source images from a MinIO/S3-compatible object store.
///
/// Request signing is delegated to `rusty_s3`, which only builds signed
/// URLs — the actual transfer still goes through `reqwest`, so no second
/// HTTP stack is introduced.
pub struct MinioSource {
    bucket: Bucket,
    credentials: Credentials,
    client: Client,
}

/// Presigned GET URLs are short-lived; 30s matches the fetch timeout below.
const SIGN_TTL: Duration = Duration::from_secs(30);

impl MinioSource {
    pub fn new(cfg: &MinioConfig) -> Result<Self, IiifError> {
        let scheme = if cfg.use_ssl { "https" } else { "http" };
        let endpoint = format!("{scheme}://{}", cfg.endpoint)
            .parse()
            .map_err(|e| IiifError::InternalServerError(format!("bad minio endpoint: {e}")))?;
        let bucket = Bucket::new(endpoint, UrlStyle::Path, cfg.bucket.clone(), "us-east-1".to_string())
            .map_err(|e| IiifError::InternalServerError(format!("bad minio bucket config: {e}")))?;
        let credentials = Credentials::new(&cfg.access_key, &cfg.secret_key);
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| IiifError::InternalServerError(e.to_string()))?;
        Ok(Self { bucket, credentials, client })
    }

    /// Lightweight connectivity probe with a tight 5s deadline.
    pub async fn ping(&self) -> bool {
        let probe = Client::builder()
            .timeout(Duration::from_secs(5))
            .build();
        let Ok(probe) = probe else { return false };
        let action = self.bucket.get_object(Some(&self.credentials), "");
        let url = action.sign(SIGN_TTL);
        probe.head(url).send().await.is_ok()
    }
}

#[async_trait]
impl SourceBackend for MinioSource {
    async fn fetch(&self, identifier: &str) -> Result<Vec<u8>, IiifError> {
        let action = self.bucket.get_object(Some(&self.credentials), identifier);
        let url = action.sign(SIGN_TTL);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| IiifError::UpstreamError(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(IiifError::NotFound(identifier.to_string()));
        }
        if !resp.status().is_success() {
            return Err(IiifError::UpstreamError(format!(
                "object store returned status {}",
                resp.status()
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| IiifError::UpstreamError(e.to_string()))?
            .to_vec();

        validate_image_bytes(&bytes)?;
        Ok(bytes)
    }
}

//! Image Source: resolves an identifier to raw encoded bytes, either from
//! the local filesystem or a MinIO/S3-compatible object store.
//!
//! Streaming download with size enforcement over `reqwest`, behind a
//! `SourceBackend` trait so the object-store variant can reuse the same
//! client and validation as any other caller.

pub mod local;
pub mod minio;

pub use local::LocalFsSource;
pub use minio::MinioSource;

use async_trait::async_trait;

use crate::error::IiifError;

/// Resolves an identifier to the raw encoded bytes of the source image.
/// No transformation happens here — determinism is a Pipeline concern.
#[async_trait]
pub trait SourceBackend: Send + Sync {
    async fn fetch(&self, identifier: &str) -> Result<Vec<u8>, IiifError>;
}

/// Validates fetched bytes are a decodable, non-degenerate image.
///
/// Shared by both backends so a corrupt local file and a corrupt object
/// both fail the same way (`InternalServerError`, since by the time we
/// have bytes in hand a decode failure is the Pipeline's concern, not a
/// malformed-request concern).
pub(crate) fn validate_image_bytes(bytes: &[u8]) -> Result<(), IiifError> {
    use image::GenericImageView;

    let fmt = image::guess_format(bytes)
        .map_err(|e| IiifError::InternalServerError(format!("unrecognised image data: {e}")))?;
    let img = image::load_from_memory_with_format(bytes, fmt)
        .map_err(|e| IiifError::InternalServerError(format!("failed to decode image: {e}")))?;
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Err(IiifError::InternalServerError(
            "image has zero-sized dimension".into(),
        ));
    }
    Ok(())
}

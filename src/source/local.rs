use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::IiifError;
use crate::source::SourceBackend;

/// Reads source images from `<imageDir>/<identifier>`.
pub struct LocalFsSource {
    image_dir: PathBuf,
}

impl LocalFsSource {
    pub fn new(image_dir: PathBuf) -> Self {
        Self { image_dir }
    }
}

#[async_trait]
impl SourceBackend for LocalFsSource {
    async fn fetch(&self, identifier: &str) -> Result<Vec<u8>, IiifError> {
        let path = self.image_dir.join(identifier);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(IiifError::NotFound(identifier.to_string()))
            }
            Err(e) => Err(IiifError::UpstreamError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetches_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("demo.jpg"), b"fake-bytes")
            .await
            .unwrap();
        let source = LocalFsSource::new(dir.path().to_path_buf());
        let bytes = source.fetch("demo.jpg").await.unwrap();
        assert_eq!(bytes, b"fake-bytes");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalFsSource::new(dir.path().to_path_buf());
        let err = source.fetch("missing.jpg").await.unwrap_err();
        assert!(matches!(err, IiifError::NotFound(_)));
    }
}

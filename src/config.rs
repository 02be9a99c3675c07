use std::path::PathBuf;

use thiserror::Error;

/// MinIO / S3-compatible object store connection settings.
#[derive(Debug, Clone)]
pub struct MinioConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub use_ssl: bool,
}

/// Redis connection settings for the primary byte cache.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: i64,
    pub use_tls: bool,
}

impl RedisConfig {
    pub fn connection_url(&self) -> String {
        let scheme = if self.use_tls { "rediss" } else { "redis" };
        match &self.password {
            Some(pw) => format!("{scheme}://:{pw}@{}:{}/{}", self.host, self.port, self.db),
            None => format!("{scheme}://{}:{}/{}", self.host, self.port, self.db),
        }
    }
}

/// CORS settings. The router itself treats CORS middleware as an external
/// collaborator — carried here so the config type is complete for whatever
/// wires the actual middleware in.
#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
    pub allow_credentials: bool,
    pub max_age: u64,
}

/// Immutable server configuration, loaded once at startup. A plain record
/// with no runtime mutation — config changes require a restart.
///
/// YAML-file loading is left as a seam: construct this struct directly, or
/// add a loader on top of it.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub image_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub max_pixels: u64,
    pub concurrency: usize,
    pub enable_https: bool,
    pub cert_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
    pub minio: MinioConfig,
    pub cache_max_size: Option<u64>,
    pub cors: CorsConfig,
    pub read_minio: bool,
    pub version: String,
    pub redis: RedisConfig,
    /// Batch size for the sentinel eviction job (default 100).
    pub eviction_batch_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("./images"),
            cache_dir: PathBuf::from("./cache"),
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_pixels: 10_000_000,
            concurrency: num_cpus_hint(),
            enable_https: false,
            cert_file: None,
            key_file: None,
            minio: MinioConfig {
                endpoint: "localhost:9000".to_string(),
                access_key: String::new(),
                secret_key: String::new(),
                bucket: "images".to_string(),
                use_ssl: false,
            },
            cache_max_size: None,
            cors: CorsConfig::default(),
            read_minio: false,
            version: "v3".to_string(),
            redis: RedisConfig {
                host: "127.0.0.1".to_string(),
                port: 6379,
                password: None,
                db: 0,
                use_tls: false,
            },
            eviction_batch_size: 100,
        }
    }
}

fn num_cpus_hint() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("maxPixels must be > 0")]
    InvalidMaxPixels,
    #[error("concurrency must be > 0")]
    InvalidConcurrency,
    #[error("readMinIO is set but minio.bucket is empty")]
    MissingMinioBucket,
    #[error("version prefix cannot be empty")]
    EmptyVersion,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pixels == 0 {
            return Err(ConfigError::InvalidMaxPixels);
        }
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }
        if self.version.trim().is_empty() {
            return Err(ConfigError::EmptyVersion);
        }
        if self.read_minio && self.minio.bucket.trim().is_empty() {
            return Err(ConfigError::MissingMinioBucket);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_max_pixels_rejected() {
        let mut cfg = ServerConfig::default();
        cfg.max_pixels = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidMaxPixels)));
    }

    #[test]
    fn read_minio_without_bucket_rejected() {
        let mut cfg = ServerConfig::default();
        cfg.read_minio = true;
        cfg.minio.bucket = String::new();
        assert!(matches!(cfg.validate(), Err(ConfigError::MissingMinioBucket)));
    }

    #[test]
    fn redis_connection_url_with_password() {
        let mut cfg = RedisConfig {
            host: "cache.local".into(),
            port: 6380,
            password: Some("secret".into()),
            db: 2,
            use_tls: true,
        };
        assert_eq!(cfg.connection_url(), "rediss://:secret@cache.local:6380/2");
        cfg.password = None;
        assert_eq!(cfg.connection_url(), "rediss://cache.local:6380/2");
    }
}

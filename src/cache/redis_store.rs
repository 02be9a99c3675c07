use async_trait::async_trait;
use redis::AsyncCommands;

use crate::config::RedisConfig;
use crate::error::IiifError;

/// The authoritative byte store behind the primary cache tier. A trait so
/// tests can swap in an in-memory fake instead of a real Redis instance
/// (see `cache::mod::tests`).
#[async_trait]
pub trait PrimaryStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, IiifError>;
    async fn set(&self, key: &str, bytes: &[u8], ttl_seconds: u64) -> Result<(), IiifError>;
}

/// Redis-backed primary store, keyed by `sha256(identifier)` hex strings.
pub struct RedisStore {
    manager: redis::aio::ConnectionManager,
    ttl_seconds: u64,
}

impl RedisStore {
    pub async fn connect(cfg: &RedisConfig, ttl_seconds: u64) -> Result<Self, IiifError> {
        let client = redis::Client::open(cfg.connection_url())
            .map_err(|e| IiifError::UpstreamError(format!("invalid redis config: {e}")))?;
        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| IiifError::UpstreamError(format!("redis connect failed: {e}")))?;
        Ok(Self { manager, ttl_seconds })
    }
}

#[async_trait]
impl PrimaryStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, IiifError> {
        let mut conn = self.manager.clone();
        // A store outage degrades to "always load", never a hard error, so
        // lookups swallow I/O failures.
        match conn.get::<_, Option<Vec<u8>>>(key).await {
            Ok(v) => Ok(v),
            Err(e) => {
                tracing::warn!("redis get failed for {key}: {e}");
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, bytes: &[u8], ttl_seconds: u64) -> Result<(), IiifError> {
        let mut conn = self.manager.clone();
        let ttl = if ttl_seconds == 0 { self.ttl_seconds } else { ttl_seconds };
        conn.set_ex::<_, _, ()>(key, bytes, ttl)
            .await
            .map_err(|e| IiifError::UpstreamError(format!("redis set failed: {e}")))
    }
}

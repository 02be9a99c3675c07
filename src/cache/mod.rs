//! Cache layer: a two-tier keyed byte cache with single-flight loading and
//! periodic sentinel eviction.
//!
//! Splits the authoritative bytes (Redis, behind `PrimaryStore`) from a
//! cheap local existence marker (the filesystem sentinel) used for
//! fast-path hit checks and LRU-by-mtime eviction, with per-identifier
//! single-flight added via `cache::locks`.

pub mod http_headers;
pub mod locks;
pub mod redis_store;
pub mod sentinel;

pub use http_headers::{cache_control_middleware, ResponseCacheConfig};
pub use redis_store::{PrimaryStore, RedisStore};
pub use sentinel::SentinelStore;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::error::IiifError;
use locks::LockTable;

/// Default primary-store TTL for cached source bytes: 24 hours.
pub const DEFAULT_TTL_SECONDS: u64 = 24 * 60 * 60;

pub fn key_for(identifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identifier.as_bytes());
    hex::encode(hasher.finalize())
}

/// The two-tier cache: `primary` holds the bytes, `sentinel` tracks
/// existence for cheap local checks and eviction ordering, `locks` enforces
/// a single in-flight fetch per identifier.
pub struct TieredCache {
    primary: Arc<dyn PrimaryStore>,
    sentinel: Arc<SentinelStore>,
    locks: LockTable,
    ttl_seconds: u64,
}

impl TieredCache {
    pub fn new(primary: Arc<dyn PrimaryStore>, cache_dir: PathBuf, ttl_seconds: u64) -> Self {
        Self {
            primary,
            sentinel: Arc::new(SentinelStore::new(cache_dir)),
            locks: LockTable::new(),
            ttl_seconds,
        }
    }

    /// Computes the key, takes the per-identifier lock, checks
    /// sentinel+primary, repairs a dangling sentinel, loads on miss, then
    /// writes primary before sentinel (swallowing sentinel-write failure).
    pub async fn get_or_load<F, Fut>(
        &self,
        identifier: &str,
        loader: F,
    ) -> Result<Vec<u8>, IiifError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>, IiifError>>,
    {
        let key = key_for(identifier);
        let lock = self.locks.get(&key);
        let _guard = lock.lock().await;

        if self.sentinel.exists(&key).await {
            if let Some(bytes) = self.primary.get(&key).await? {
                return Ok(bytes);
            }
            // Sentinel exists but the primary entry behind it is gone (evicted,
            // expired, or never written) — treat it as a miss and drop the stale marker.
            if let Err(e) = self.sentinel.delete(&key).await {
                tracing::warn!("failed to repair dangling sentinel for {key}: {e}");
            }
        }

        let bytes = loader().await?;

        if let Err(e) = self.primary.set(&key, &bytes, self.ttl_seconds).await {
            tracing::warn!("failed to write primary cache entry for {key}: {e}");
        } else if let Err(e) = self.sentinel.create(&key).await {
            tracing::warn!("failed to write sentinel for {key}: {e}");
        }

        Ok(bytes)
    }

    pub fn sentinel_store(&self) -> Arc<SentinelStore> {
        self.sentinel.clone()
    }
}

/// Spawns the periodic sentinel-eviction job: a sweep every 24h, retried
/// once after 5 minutes on failure.
pub fn spawn_eviction_job(sentinel: Arc<SentinelStore>, batch_size: usize) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(24 * 60 * 60));
        loop {
            interval.tick().await;
            if let Err(e) = sentinel.evict_oldest(batch_size).await {
                tracing::warn!("sentinel eviction failed, retrying in 5m: {e}");
                tokio::time::sleep(Duration::from_secs(5 * 60)).await;
                if let Err(e) = sentinel.evict_oldest(batch_size).await {
                    tracing::error!("sentinel eviction retry failed: {e}");
                }
            }
        }
    });
}

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tokio::sync::Mutex;

/// Local-filesystem existence markers for the primary cache: each entry is
/// an empty file named after its key, with mtime used for LRU eviction.
///
/// The eviction job's directory lock is separate from — and intentionally
/// not the same mutex as — the per-identifier lock table in `cache::locks`.
/// It serializes concurrent eviction sweeps against each other and against
/// sentinel creation/deletion, without blocking unrelated identifiers'
/// `get_or_load` calls.
pub struct SentinelStore {
    dir: PathBuf,
    eviction_lock: Mutex<()>,
}

impl SentinelStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir, eviction_lock: Mutex::new(()) }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    pub async fn exists(&self, key: &str) -> bool {
        tokio::fs::metadata(self.path_for(key)).await.is_ok()
    }

    pub async fn create(&self, key: &str) -> std::io::Result<()> {
        if !self.dir.exists() {
            tokio::fs::create_dir_all(&self.dir).await?;
        }
        tokio::fs::write(self.path_for(key), []).await
    }

    pub async fn delete(&self, key: &str) -> std::io::Result<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Lists sentinel files sorted ascending by mtime (oldest first),
    /// deletes up to `batch_size` of the oldest, and returns how many were
    /// removed. Takes the eviction lock for its whole duration.
    pub async fn evict_oldest(&self, batch_size: usize) -> std::io::Result<usize> {
        let _guard = self.eviction_lock.lock().await;

        let mut entries: Vec<(PathBuf, SystemTime)> = Vec::new();
        let mut read_dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };
        while let Some(entry) = read_dir.next_entry().await? {
            let meta = entry.metadata().await?;
            if meta.is_file() {
                let mtime = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                entries.push((entry.path(), mtime));
            }
        }
        entries.sort_by_key(|(_, mtime)| *mtime);

        let mut removed = 0;
        for (path, _) in entries.into_iter().take(batch_size) {
            tokio::fs::remove_file(&path).await?;
            removed += 1;
        }
        Ok(removed)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_exists() {
        let dir = tempfile::tempdir().unwrap();
        let store = SentinelStore::new(dir.path().to_path_buf());
        assert!(!store.exists("abc").await);
        store.create("abc").await.unwrap();
        assert!(store.exists("abc").await);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SentinelStore::new(dir.path().to_path_buf());
        store.delete("missing").await.unwrap();
        store.create("abc").await.unwrap();
        store.delete("abc").await.unwrap();
        assert!(!store.exists("abc").await);
    }

    #[tokio::test]
    async fn evict_oldest_removes_batch_in_mtime_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = SentinelStore::new(dir.path().to_path_buf());
        for key in ["a", "b", "c", "d"] {
            store.create(key).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        let removed = store.evict_oldest(2).await.unwrap();
        assert_eq!(removed, 2);
        assert!(!store.exists("a").await);
        assert!(!store.exists("b").await);
        assert!(store.exists("c").await);
        assert!(store.exists("d").await);
    }
}

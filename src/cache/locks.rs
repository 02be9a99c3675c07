use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

/// Per-identifier lock table enforcing at most one in-flight source fetch
/// per identifier at any instant.
///
/// A `DashMap<K, Arc<Mutex<()>>>` keyed lock table. Entries are created on
/// first use and retained for the process lifetime — identifier
/// cardinality is bounded by the image collection size, so evicting unused
/// entries isn't worth the complexity.
#[derive(Default)]
pub struct LockTable {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self { locks: DashMap::new() }
    }

    /// Returns the mutex for `key`, inserting a fresh one if this is the
    /// first time `key` has been seen.
    pub fn get(&self, key: &str) -> Arc<Mutex<()>> {
        if let Some(existing) = self.locks.get(key) {
            return existing.clone();
        }
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_returns_same_mutex() {
        let table = LockTable::new();
        let a = table.get("demo.jpg");
        let b = table.get("demo.jpg");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn distinct_keys_return_distinct_mutexes() {
        let table = LockTable::new();
        let a = table.get("demo.jpg");
        let b = table.get("other.jpg");
        assert!(!Arc::ptr_eq(&a, &b));
    }
}

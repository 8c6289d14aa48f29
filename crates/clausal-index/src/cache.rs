//! Time-bounded cache of built indexes keyed by document list
//!
//! The lock guards only map operations; callers build indexes outside it.

use crate::vector_index::IndexHandle;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

struct CachedIndex {
    built_at: Instant,
    handle: IndexHandle,
}

/// Cache of [`IndexHandle`]s for identical document lists
pub struct IndexCache {
    ttl: Duration,
    entries: Mutex<HashMap<Vec<String>, CachedIndex>>,
}

impl IndexCache {
    /// Create a cache whose entries live for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Entry lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fetch a live entry for `documents`
    pub fn get(&self, documents: &[String]) -> Option<IndexHandle> {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        match entries.get(documents) {
            Some(entry) if entry.built_at.elapsed() < self.ttl => Some(entry.handle.clone()),
            Some(_) => {
                debug!(documents = documents.len(), "Cached index expired");
                entries.remove(documents);
                None
            }
            None => None,
        }
    }

    /// Store an index for `documents`, replacing any previous entry
    ///
    /// Expired entries for other document lists are dropped first.
    pub fn insert(&self, documents: Vec<String>, handle: IndexHandle) {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        let before = entries.len();
        entries.retain(|_, e| e.built_at.elapsed() < self.ttl);
        if entries.len() < before {
            debug!(evicted = before - entries.len(), "Evicted expired indexes");
        }
        entries.insert(
            documents,
            CachedIndex {
                built_at: Instant::now(),
                handle,
            },
        );
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        let before = entries.len();
        entries.retain(|_, e| e.built_at.elapsed() < self.ttl);
        before - entries.len()
    }

    /// Number of entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    /// True when the cache holds nothing
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_index::EmbeddingIndex;
    use std::sync::Arc;

    fn docs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_hit_for_identical_documents() {
        let cache = IndexCache::new(Duration::from_secs(60));
        let handle = Arc::new(EmbeddingIndex::empty(4));
        cache.insert(docs(&["a.pdf", "b.pdf"]), handle.clone());

        let hit = cache.get(&docs(&["a.pdf", "b.pdf"])).unwrap();
        assert!(Arc::ptr_eq(&hit, &handle));
        assert!(cache.get(&docs(&["b.pdf", "a.pdf"])).is_none());
    }

    #[test]
    fn test_expired_entries_miss() {
        let cache = IndexCache::new(Duration::ZERO);
        cache.insert(docs(&["a.pdf"]), Arc::new(EmbeddingIndex::empty(4)));
        assert!(cache.get(&docs(&["a.pdf"])).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_evicts_expired_entries() {
        let cache = IndexCache::new(Duration::from_millis(50));
        for i in 0..100 {
            let name = format!("{}.pdf", i);
            cache.insert(docs(&[name.as_str()]), Arc::new(EmbeddingIndex::empty(1)));
        }
        std::thread::sleep(Duration::from_millis(80));

        cache.insert(docs(&["fresh.pdf"]), Arc::new(EmbeddingIndex::empty(1)));
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&docs(&["fresh.pdf"])).is_some());
    }

    #[test]
    fn test_purge_expired() {
        let cache = IndexCache::new(Duration::ZERO);
        cache.insert(docs(&["a"]), Arc::new(EmbeddingIndex::empty(1)));
        cache.insert(docs(&["b"]), Arc::new(EmbeddingIndex::empty(1)));
        // "a" was already evicted by the second insert
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.is_empty());
    }
}

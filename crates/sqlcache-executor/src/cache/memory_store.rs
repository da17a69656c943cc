//! In-process cache store with LRU eviction
//!
//! Caches result rows keyed by [`CacheKey`] and removes them by tag
//! intersection. Entries may carry an expiry through the passthrough keys
//! `px` (milliseconds) or `ex` (seconds); `px` wins when both are present.

use std::{
    num::NonZeroUsize,
    sync::atomic::{AtomicUsize, Ordering},
    time::{Duration, Instant},
};

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use sqlcache_types::Row;
use tracing::debug;

use super::{CacheEntry, CacheKey, CacheStore, Invalidation, MutationEvent, Passthrough};
use crate::errors::CacheError;

/// Capacity used when zero is requested
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Statistics about cache performance
#[derive(Clone, Debug, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub evictions: usize,
    pub invalidations: usize,
    pub size: usize,
    pub hit_rate: f64,
}

struct StoredEntry {
    entry: CacheEntry,
    expires_at: Option<Instant>,
}

impl StoredEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Thread-safe in-memory store for query results
pub struct MemoryStore {
    entries: Mutex<LruCache<CacheKey, StoredEntry>>,
    max_entries: usize,
    hits: AtomicUsize,
    misses: AtomicUsize,
    evictions: AtomicUsize,
    invalidations: AtomicUsize,
}

impl MemoryStore {
    /// Create a store holding at most `max_entries` results (0 = default)
    pub fn new(max_entries: usize) -> Self {
        let max_entries = if max_entries == 0 { DEFAULT_MAX_ENTRIES } else { max_entries };
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);

        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            max_entries,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            evictions: AtomicUsize::new(0),
            invalidations: AtomicUsize::new(0),
        }
    }

    /// Check if a key is cached, without touching recency
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.lock().peek(key).is_some_and(|stored| !stored.is_expired(Instant::now()))
    }

    /// Tags stored with `key`, if cached
    pub fn tags_of(&self, key: &CacheKey) -> Option<Vec<String>> {
        self.entries
            .lock()
            .peek(key)
            .filter(|stored| !stored.is_expired(Instant::now()))
            .map(|stored| stored.entry.tags.iter().cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 { hits as f64 / total as f64 } else { 0.0 };

        CacheStats {
            hits,
            misses,
            evictions: self.evictions.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            size: self.len(),
            hit_rate,
        }
    }

    /// Get maximum number of entries
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Remove every entry selected by `predicate`, returning how many went
    fn remove_where(&self, predicate: impl Fn(&CacheEntry) -> bool) -> usize {
        let mut entries = self.entries.lock();
        let doomed: Vec<CacheKey> = entries
            .iter()
            .filter(|(_, stored)| predicate(&stored.entry))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &doomed {
            entries.pop(key);
        }

        self.invalidations.fetch_add(doomed.len(), Ordering::Relaxed);
        doomed.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

/// Time-to-live requested through the passthrough map
fn ttl_from(passthrough: &Passthrough) -> Option<Duration> {
    if let Some(ms) = passthrough.get("px").and_then(|v| v.as_u64()) {
        return Some(Duration::from_millis(ms));
    }
    passthrough.get("ex").and_then(|v| v.as_u64()).map(Duration::from_secs)
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<Row>>, CacheError> {
        let mut entries = self.entries.lock();

        let expired = match entries.get(key) {
            Some(stored) if stored.is_expired(Instant::now()) => true,
            Some(stored) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Some(stored.entry.rows.clone()));
            }
            None => false,
        };

        if expired {
            entries.pop(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        Ok(None)
    }

    async fn put(&self, key: CacheKey, entry: CacheEntry) -> Result<(), CacheError> {
        let expires_at = ttl_from(&entry.passthrough).map(|ttl| Instant::now() + ttl);
        let stored = StoredEntry { entry, expires_at };

        let mut entries = self.entries.lock();
        // `push` also hands back the old value when the key was already present
        if let Some((evicted, _)) = entries.push(key.clone(), stored) {
            if evicted != key {
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    async fn invalidate(&self, target: &Invalidation) -> Result<(), CacheError> {
        if target.is_empty() {
            return Ok(());
        }
        let removed = self.remove_where(|entry| target.matches(&entry.tags));
        debug!(tables = ?target.tables, tags = ?target.tags, removed, "invalidated cache entries");
        Ok(())
    }

    async fn on_mutate(&self, event: &MutationEvent) -> Result<(), CacheError> {
        if event.tables.is_empty() {
            return Ok(());
        }
        let removed = self.remove_where(|entry| event.matches(entry));
        debug!(tables = ?event.tables, removed, "evicted entries after mutation");
        Ok(())
    }
}

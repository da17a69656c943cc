//! Cache store abstraction
//!
//! The store owns entry lifecycle: creation on `put`, removal on invalidation
//! and any eviction or expiry policy of its own. The cache layer never looks
//! inside entries beyond hit or miss.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlcache_ast::Statement;
use sqlcache_types::Row;

use super::{CacheKey, Passthrough};
use crate::errors::CacheError;

/// Value written to the store for one cached read
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub rows: Vec<Row>,
    /// Exactly `{tag}` for custom-tagged reads, else the read's used tables
    pub tags: BTreeSet<String>,
    /// Whether `on_mutate` may evict this entry
    pub auto_invalidate: bool,
    pub passthrough: Passthrough,
}

/// Manual invalidation request
///
/// Table names map 1:1 onto tags of the same string. An entry is removed when
/// its tag set intersects either list. Both lists empty means nothing to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invalidation {
    pub tables: Vec<String>,
    pub tags: Vec<String>,
}

impl Invalidation {
    pub fn table(table: impl Into<String>) -> Self {
        Invalidation { tables: vec![table.into()], tags: Vec::new() }
    }

    pub fn tables<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invalidation { tables: tables.into_iter().map(Into::into).collect(), tags: Vec::new() }
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        Invalidation { tables: Vec::new(), tags: vec![tag.into()] }
    }

    pub fn tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invalidation { tables: Vec::new(), tags: tags.into_iter().map(Into::into).collect() }
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.tags.is_empty()
    }

    /// Whether an entry carrying `entry_tags` is targeted
    pub fn matches(&self, entry_tags: &BTreeSet<String>) -> bool {
        self.tables.iter().chain(self.tags.iter()).any(|t| entry_tags.contains(t))
    }
}

/// Emitted once per successful write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationEvent {
    pub tables: BTreeSet<String>,
}

impl MutationEvent {
    /// Event for the target tables of a write statement
    pub fn from_statement(stmt: &Statement) -> Self {
        MutationEvent {
            tables: stmt.target_tables().into_iter().map(|t| t.canonical_name().to_string()).collect(),
        }
    }

    /// Whether an entry must be evicted by this mutation
    pub fn matches(&self, entry: &CacheEntry) -> bool {
        entry.auto_invalidate && self.tables.iter().any(|t| entry.tags.contains(t))
    }
}

/// Backend holding cached read results
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up a cached result; `Ok(None)` is a miss
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<Row>>, CacheError>;

    /// Insert or replace the entry under `key`
    async fn put(&self, key: CacheKey, entry: CacheEntry) -> Result<(), CacheError>;

    /// Remove entries targeted by a manual invalidation
    async fn invalidate(&self, target: &Invalidation) -> Result<(), CacheError>;

    /// Remove entries affected by a successful write
    ///
    /// The default treats the mutation as a table invalidation; stores that
    /// keep `auto_invalidate` should skip entries that opted out.
    async fn on_mutate(&self, event: &MutationEvent) -> Result<(), CacheError> {
        self.invalidate(&Invalidation::tables(event.tables.iter().cloned())).await
    }

    /// True for stores that never hold anything
    fn is_noop(&self) -> bool {
        false
    }
}

/// Store used when no cache is configured: always misses, drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStore;

#[async_trait]
impl CacheStore for NoopStore {
    async fn get(&self, _key: &CacheKey) -> Result<Option<Vec<Row>>, CacheError> {
        Ok(None)
    }

    async fn put(&self, _key: CacheKey, _entry: CacheEntry) -> Result<(), CacheError> {
        Ok(())
    }

    async fn invalidate(&self, _target: &Invalidation) -> Result<(), CacheError> {
        Ok(())
    }

    async fn on_mutate(&self, _event: &MutationEvent) -> Result<(), CacheError> {
        Ok(())
    }

    fn is_noop(&self) -> bool {
        true
    }
}

//! Cached read path
//!
//! A [`PreparedSelect`] fixes its used tables and cache mode when it is built.
//! Executing it only derives the cache key from the bound parameters.
//!
//! Per call: `Disabled` goes straight to the driver. Otherwise the store is
//! consulted first; a hit returns without touching the driver, a miss runs
//! the driver and stores the rows only after it succeeded. Store failures on
//! this path degrade to a miss (or a skipped write) and never fail the read.

use std::sync::Arc;

use sqlcache_ast::{CompiledQuery, Statement};
use sqlcache_types::{Row, SqlValue};
use tracing::{debug, warn};

use super::{
    extract_tables_from_select, mode, CacheEntry, CacheKey, CacheMode, CacheOverride, CacheStore,
    EnabledCache, GlobalCacheConfig, UsedTables,
};
use crate::{driver::Driver, errors::ExecutorError};

/// A read statement bound to its cache decision
pub struct PreparedSelect {
    query: CompiledQuery,
    used_tables: UsedTables,
    global: GlobalCacheConfig,
    mode: CacheMode,
    store: Arc<dyn CacheStore>,
    driver: Arc<dyn Driver>,
}

impl PreparedSelect {
    /// Prepare `query` under the global configuration, without a per-call override
    pub fn new(
        query: CompiledQuery,
        global: GlobalCacheConfig,
        store: Arc<dyn CacheStore>,
        driver: Arc<dyn Driver>,
    ) -> Result<Self, ExecutorError> {
        let used_tables = match &query.statement {
            Statement::Select(select) => extract_tables_from_select(select),
            other => {
                return Err(ExecutorError::UnexpectedStatement { expected: "read", actual: other.kind() })
            }
        };

        // Without a store there is nothing to consult
        let mode = if store.is_noop() {
            CacheMode::Disabled
        } else {
            mode::resolve(&global, None, &used_tables)
        };

        Ok(Self { query, used_tables, global, mode, store, driver })
    }

    /// Apply a per-call cache override (`true`, `false` or [`super::CacheOptions`])
    pub fn with_cache(mut self, cache_override: impl Into<CacheOverride>) -> Self {
        if !self.store.is_noop() {
            self.mode = mode::resolve(&self.global, Some(&cache_override.into()), &self.used_tables);
        }
        self
    }

    pub fn used_tables(&self) -> &UsedTables {
        &self.used_tables
    }

    pub fn mode(&self) -> &CacheMode {
        &self.mode
    }

    pub fn query(&self) -> &CompiledQuery {
        &self.query
    }

    /// Execute with the parameters bound at compile time
    pub async fn execute(&self) -> Result<Vec<Row>, ExecutorError> {
        self.run(&self.query.params).await
    }

    /// Execute with new parameter bindings for the same SQL
    pub async fn execute_with(&self, params: &[SqlValue]) -> Result<Vec<Row>, ExecutorError> {
        self.run(params).await
    }

    async fn run(&self, params: &[SqlValue]) -> Result<Vec<Row>, ExecutorError> {
        match &self.mode {
            CacheMode::Disabled => {
                debug!(sql = %self.query.sql, "cache disabled, bypassing store");
                Ok(self.driver.execute(&self.query.sql, params).await?)
            }
            CacheMode::Enabled(cache) => self.read_through(cache, params).await,
        }
    }

    async fn read_through(&self, cache: &EnabledCache, params: &[SqlValue]) -> Result<Vec<Row>, ExecutorError> {
        let key = CacheKey::new(&self.query.sql, params);

        match self.store.get(&key).await {
            Ok(Some(rows)) => {
                debug!(%key, "cache hit");
                return Ok(rows);
            }
            Ok(None) => debug!(%key, "cache miss"),
            Err(e) => warn!(%key, error = %e, "cache lookup failed, treating as miss"),
        }

        let rows = match self.driver.execute(&self.query.sql, params).await {
            Ok(rows) => rows,
            Err(e) => {
                debug!(%key, error = %e, "driver failed, nothing stored");
                return Err(e.into());
            }
        };

        let entry = CacheEntry {
            rows: rows.clone(),
            tags: cache.tags.clone(),
            auto_invalidate: cache.auto_invalidate,
            passthrough: cache.passthrough.clone(),
        };
        match self.store.put(key.clone(), entry).await {
            Ok(()) => debug!(%key, tags = ?cache.tags, "stored result"),
            Err(e) => warn!(%key, error = %e, "cache write failed, result not cached"),
        }

        Ok(rows)
    }
}

//! Cached database handle
//!
//! [`QueryCache`] pairs a driver with a [`CacheSetup`] chosen at construction
//! time. The setup is an ordinary value handed to every prepared read; there
//! is no process-wide cache registry.

use std::sync::Arc;

use sqlcache_ast::CompiledQuery;
use sqlcache_types::Row;
use tracing::debug;

use crate::{
    cache::{
        CacheStore, CacheStrategy, GlobalCacheConfig, Invalidation, MutationInterceptor, NoopStore,
        Passthrough, PreparedSelect,
    },
    driver::Driver,
    errors::ExecutorError,
};

/// Store plus global defaults used by a [`QueryCache`]
#[derive(Clone)]
pub struct CacheSetup {
    pub store: Arc<dyn CacheStore>,
    pub global: GlobalCacheConfig,
}

impl CacheSetup {
    /// No cache: every read goes to the driver, writes evict nothing
    pub fn none() -> Self {
        Self { store: Arc::new(NoopStore), global: GlobalCacheConfig::default() }
    }

    /// Reads are cached only when they opt in
    pub fn explicit(store: Arc<dyn CacheStore>) -> Self {
        Self::with_strategy(store, CacheStrategy::Explicit)
    }

    /// Reads are cached unless they opt out
    pub fn all(store: Arc<dyn CacheStore>) -> Self {
        Self::with_strategy(store, CacheStrategy::All)
    }

    pub fn with_strategy(store: Arc<dyn CacheStore>, strategy: CacheStrategy) -> Self {
        Self { store, global: GlobalCacheConfig { strategy, default_config: Passthrough::new() } }
    }

    /// Passthrough applied to every cached read unless overridden per call
    pub fn with_default_config(mut self, config: Passthrough) -> Self {
        self.global.default_config = config;
        self
    }
}

impl Default for CacheSetup {
    fn default() -> Self {
        Self::none()
    }
}

/// Driver wrapped with result caching and write-driven invalidation
pub struct QueryCache {
    driver: Arc<dyn Driver>,
    setup: CacheSetup,
    mutations: MutationInterceptor,
}

impl QueryCache {
    pub fn new(driver: Arc<dyn Driver>, setup: CacheSetup) -> Self {
        let mutations = MutationInterceptor::new(Arc::clone(&setup.store));
        Self { driver, setup, mutations }
    }

    /// Prepare a read; chain `with_cache` to override the global strategy
    pub fn select(&self, query: CompiledQuery) -> Result<PreparedSelect, ExecutorError> {
        PreparedSelect::new(
            query,
            self.setup.global.clone(),
            Arc::clone(&self.setup.store),
            Arc::clone(&self.driver),
        )
    }

    /// Run a write and evict cached reads of its target tables
    pub async fn write(&self, query: &CompiledQuery) -> Result<Vec<Row>, ExecutorError> {
        self.mutations.execute(self.driver.as_ref(), query).await
    }

    /// Route a statement by kind: reads use the global strategy, writes invalidate
    pub async fn execute(&self, query: CompiledQuery) -> Result<Vec<Row>, ExecutorError> {
        if query.kind().is_write() {
            self.write(&query).await
        } else {
            self.select(query)?.execute().await
        }
    }

    /// Manually evict entries by table or tag
    pub async fn invalidate(&self, target: Invalidation) -> Result<(), ExecutorError> {
        if target.is_empty() || self.setup.store.is_noop() {
            return Ok(());
        }
        debug!(tables = ?target.tables, tags = ?target.tags, "manual invalidation");
        self.setup.store.invalidate(&target).await?;
        Ok(())
    }

    pub fn strategy(&self) -> CacheStrategy {
        self.setup.global.strategy
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.setup.store
    }
}

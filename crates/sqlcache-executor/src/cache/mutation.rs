//! Invalidating write path

use std::sync::Arc;

use sqlcache_ast::CompiledQuery;
use sqlcache_types::Row;
use tracing::{debug, warn};

use super::{CacheStore, MutationEvent};
use crate::{driver::Driver, errors::ExecutorError};

/// Runs INSERT / UPDATE / DELETE and evicts dependent cached reads
///
/// Eviction is awaited before the write reports success, so a caller that
/// reads right after writing never sees the pre-write result. A failed write
/// evicts nothing; a failed eviction fails the write.
pub struct MutationInterceptor {
    store: Arc<dyn CacheStore>,
}

impl MutationInterceptor {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, driver: &dyn Driver, query: &CompiledQuery) -> Result<Vec<Row>, ExecutorError> {
        let kind = query.kind();
        if !kind.is_write() {
            return Err(ExecutorError::UnexpectedStatement { expected: "write", actual: kind });
        }

        let rows = driver.execute(&query.sql, &query.params).await?;

        if self.store.is_noop() {
            return Ok(rows);
        }

        let event = MutationEvent::from_statement(&query.statement);
        if let Err(e) = self.store.on_mutate(&event).await {
            warn!(%kind, tables = ?event.tables, error = %e, "cache invalidation failed after write");
            return Err(e.into());
        }
        debug!(%kind, tables = ?event.tables, "write invalidated cache");

        Ok(rows)
    }
}

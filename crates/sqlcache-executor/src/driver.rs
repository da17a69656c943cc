//! Database driver seam
//!
//! The physical driver and its connection pool live outside this crate. All
//! the cache layer needs is "run this SQL with these parameters".

use async_trait::async_trait;
use sqlcache_types::{Row, SqlValue};

use crate::errors::DriverError;

/// A database driver executing compiled SQL
#[async_trait]
pub trait Driver: Send + Sync {
    /// Execute `sql` with positional `params` and return the produced rows
    ///
    /// Writes return whatever rows the statement yields (e.g. `RETURNING`),
    /// usually none.
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, DriverError>;
}


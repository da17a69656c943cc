use sqlcache_ast::StatementKind;
use thiserror::Error;

/// Errors reported by a database driver
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DriverError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Query cancelled")]
    Cancelled,
}

/// Errors reported by a cache store backend
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by cached execution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutorError {
    /// Driver failure, passed through untouched
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// Invalidation failure on the write path or a manual invalidation
    #[error("Cache invalidation failed: {0}")]
    Cache(#[from] CacheError),

    #[error("Expected a {expected} statement, got {actual}")]
    UnexpectedStatement { expected: &'static str, actual: StatementKind },
}

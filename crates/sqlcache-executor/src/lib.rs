//! Executor - Cached SQL Execution
//!
//! This crate sits between a SQL compiler and a database driver. Reads are
//! served from a pluggable store when caching applies; writes evict the
//! cached reads of the tables they touch.

pub mod cache;
pub mod config;
mod database;
pub mod driver;
pub mod errors;

pub use cache::{
    CacheEntry, CacheKey, CacheMode, CacheOptions, CacheOverride, CacheStats, CacheStore, CacheStrategy,
    GlobalCacheConfig, Invalidation, MemoryStore, MutationEvent, NoopStore, Passthrough, PreparedSelect,
    UsedTables,
};
pub use config::{Settings, StoreKind};
pub use database::{CacheSetup, QueryCache};
pub use driver::Driver;
pub use errors::{CacheError, DriverError, ExecutorError};

//! Query result caching module
//!
//! Caches rows of read statements under keys derived from SQL text and bound
//! parameters, tags each entry with the tables the statement reads, and evicts
//! entries when a write touches one of those tables.

mod memory_store;
pub mod mode;
mod mutation;
mod prepared;
mod query_signature;
mod store;
pub mod table_extractor;

pub use memory_store::{CacheStats, MemoryStore, DEFAULT_MAX_ENTRIES};
pub use mode::{
    CacheMode, CacheOptions, CacheOverride, CacheStrategy, EnabledCache, GlobalCacheConfig, Passthrough,
};
pub use mutation::MutationInterceptor;
pub use prepared::PreparedSelect;
pub use query_signature::CacheKey;
pub use store::{CacheEntry, CacheStore, Invalidation, MutationEvent, NoopStore};
pub use table_extractor::{extract_tables_from_select, UsedTables};

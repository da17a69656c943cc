//! sqlcache - Query-result cache with table-scoped invalidation
//!
//! This is the root crate that re-exports all components.

pub use sqlcache_ast as ast;
pub use sqlcache_executor as executor;
pub use sqlcache_types as types;

//! Cache key generation
//!
//! Generates deterministic cache keys from the compiled SQL text and the
//! ordered bound parameters. Unlike a plan signature, literal values are part
//! of the identity: the same statement bound to different values must never
//! share a cached result. The SQL text is hashed verbatim (no case folding or
//! whitespace collapsing) because string literals can live in it.

use std::fmt;

use md5::{Digest, Md5};
use sqlcache_ast::CompiledQuery;
use sqlcache_types::SqlValue;

/// Stable identifier of one (SQL, parameters) execution
///
/// The digest does not depend on process-local hasher seeding, so keys are
/// safe to hand to out-of-process stores.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    digest: String,
}

impl CacheKey {
    pub fn new(sql: &str, params: &[SqlValue]) -> Self {
        let mut buf = Vec::with_capacity(sql.len() + 16 + params.len() * 16);
        buf.extend_from_slice(&(sql.len() as u64).to_le_bytes());
        buf.extend_from_slice(sql.as_bytes());
        buf.extend_from_slice(&(params.len() as u64).to_le_bytes());
        for param in params {
            param.write_canonical(&mut buf);
        }

        let mut hasher = Md5::new();
        hasher.update(&buf);
        Self { digest: format!("{:x}", hasher.finalize()) }
    }

    /// Key for a compiled query with its own bound parameters
    pub fn from_query(query: &CompiledQuery) -> Self {
        Self::new(&query.sql, &query.params)
    }

    /// Hex digest
    pub fn as_str(&self) -> &str {
        &self.digest
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digest)
    }
}

//! Cache mode resolution
//!
//! Merges the global cache strategy with a per-call override into one
//! immutable [`CacheMode`]. Resolution happens once, when a read is prepared;
//! execution only ever looks at the resolved value.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::UsedTables;

/// Store-specific options carried through to `put` untouched (e.g. `ex`)
pub type Passthrough = serde_json::Map<String, serde_json::Value>;

/// Global caching strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStrategy {
    /// Reads are uncached unless they opt in
    #[default]
    Explicit,
    /// Reads are cached unless they opt out
    All,
}

/// Global cache defaults threaded into every prepared read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalCacheConfig {
    pub strategy: CacheStrategy,
    /// Base passthrough map; per-call `config` keys override it
    pub default_config: Passthrough,
}

/// Per-call cache options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheOptions {
    /// Custom tag replacing the table-derived tags
    pub tag: Option<String>,
    /// Whether table mutations evict the entry (default: true)
    pub auto_invalidate: Option<bool>,
    pub config: Option<Passthrough>,
}

impl CacheOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn auto_invalidate(mut self, auto_invalidate: bool) -> Self {
        self.auto_invalidate = Some(auto_invalidate);
        self
    }

    /// Set one passthrough key
    pub fn config_value(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.config.get_or_insert_with(Passthrough::new).insert(key.into(), value.into());
        self
    }
}

/// What a caller passed to `with_cache`
#[derive(Debug, Clone, PartialEq)]
pub enum CacheOverride {
    /// `true` enables with defaults, `false` bypasses the cache
    Flag(bool),
    Options(CacheOptions),
}

impl From<bool> for CacheOverride {
    fn from(flag: bool) -> Self {
        CacheOverride::Flag(flag)
    }
}

impl From<CacheOptions> for CacheOverride {
    fn from(options: CacheOptions) -> Self {
        CacheOverride::Options(options)
    }
}

/// Resolved caching decision for one prepared read
#[derive(Debug, Clone, PartialEq)]
pub enum CacheMode {
    Disabled,
    Enabled(EnabledCache),
}

/// Parameters of an enabled cache decision
#[derive(Debug, Clone, PartialEq)]
pub struct EnabledCache {
    /// Custom tag, if one was given
    pub tag: Option<String>,
    /// Tags attached to stored entries: `{tag}` or the used tables
    pub tags: BTreeSet<String>,
    pub auto_invalidate: bool,
    pub passthrough: Passthrough,
}

impl CacheMode {
    pub fn is_enabled(&self) -> bool {
        matches!(self, CacheMode::Enabled(_))
    }
}

/// Resolve the cache mode for a read depending on `used_tables`
///
/// | strategy | override        | result                              |
/// |----------|-----------------|-------------------------------------|
/// | explicit | none / `false`  | disabled                            |
/// | explicit | `true` / opts   | enabled                             |
/// | all      | none / `true`   | enabled                             |
/// | all      | `false`         | disabled                            |
/// | all      | opts            | enabled                             |
///
/// Unset options default to an automatic tag set and `auto_invalidate = true`.
/// A custom tag replaces the table tags entirely; the entry is then only
/// reachable through that tag.
pub fn resolve(
    global: &GlobalCacheConfig,
    cache_override: Option<&CacheOverride>,
    used_tables: &UsedTables,
) -> CacheMode {
    let options = match (global.strategy, cache_override) {
        (_, Some(CacheOverride::Flag(false))) | (CacheStrategy::Explicit, None) => {
            return CacheMode::Disabled;
        }
        (CacheStrategy::All, None) | (_, Some(CacheOverride::Flag(true))) => None,
        (_, Some(CacheOverride::Options(options))) => Some(options),
    };

    let tag = options.and_then(|o| o.tag.clone());
    let auto_invalidate = options.and_then(|o| o.auto_invalidate).unwrap_or(true);

    let mut passthrough = global.default_config.clone();
    if let Some(config) = options.and_then(|o| o.config.as_ref()) {
        for (key, value) in config {
            passthrough.insert(key.clone(), value.clone());
        }
    }

    let tags = match &tag {
        Some(tag) => BTreeSet::from([tag.clone()]),
        None => used_tables.to_tags(),
    };

    CacheMode::Enabled(EnabledCache { tag, tags, auto_invalidate, passthrough })
}

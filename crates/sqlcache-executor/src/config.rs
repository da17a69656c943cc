use std::{fs, path::Path, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheStore, CacheStrategy, MemoryStore, NoopStore, Passthrough, DEFAULT_MAX_ENTRIES};
use crate::database::CacheSetup;

/// Cache configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Caching strategy: explicit, all (default: explicit)
    pub strategy: CacheStrategy,
    /// Store backend: none, memory (default: none)
    pub store: StoreKind,
    /// Maximum cached results for the memory store (default: 1000)
    pub max_entries: usize,
    /// Passthrough options applied to every cached read (e.g. `ex = 60`)
    pub default_config: Passthrough,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    None,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            strategy: CacheStrategy::Explicit,
            store: StoreKind::None,
            max_entries: DEFAULT_MAX_ENTRIES,
            default_config: Passthrough::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl Settings {
    /// Load configuration from file
    /// Searches for sqlcache.toml in:
    /// 1. Current directory
    /// 2. $HOME/.config/sqlcache/
    /// 3. /etc/sqlcache/
    pub fn load() -> Result<Self> {
        let config_paths = vec![
            PathBuf::from("sqlcache.toml"),
            dirs::config_dir().map(|p| p.join("sqlcache").join("sqlcache.toml")).unwrap_or_default(),
            PathBuf::from("/etc/sqlcache/sqlcache.toml"),
        ];

        for path in config_paths {
            if path.is_file() {
                return Self::load_from(&path);
            }
        }

        Err(anyhow::anyhow!("No configuration file found"))
    }

    /// Load configuration from specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::parse(&contents).with_context(|| format!("Invalid config file: {:?}", path))
    }

    /// Parse configuration from TOML text
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Build the store and global defaults described by this configuration
    pub fn cache_setup(&self) -> CacheSetup {
        let store: Arc<dyn CacheStore> = match self.cache.store {
            StoreKind::None => Arc::new(NoopStore),
            StoreKind::Memory => Arc::new(MemoryStore::new(self.cache.max_entries)),
        };
        CacheSetup::with_strategy(store, self.cache.strategy).with_default_config(self.cache.default_config.clone())
    }

    /// Install a fmt subscriber; `RUST_LOG` wins over the configured level
    pub fn init_tracing(&self) {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(self.logging.level.to_lowercase())),
            )
            .try_init()
            .ok(); // Ignore error if already initialized
    }
}

//! TOML configuration parsing and validation.
//!
//! The default location is `./config/catalog.toml`. Every section is
//! optional; missing values fall back to the defaults below, which match
//! a json-server instance on `localhost:3000`.
//!
//! ```toml
//! [store]
//! base_url = "http://localhost:3000"
//! resource = "items"
//! timeout_secs = 30
//!
//! [query]
//! paging = "server"
//! default_page_size = 10
//! page_size_options = [5, 10, 25, 50]
//! search_min_chars = 3
//! debounce_ms = 500
//!
//! [server]
//! bind = "127.0.0.1:3000"
//! seed = "data/items.json"
//!
//! [ui]
//! locale = "en"
//!
//! [logging]
//! level = "info"
//! ```

use anyhow::{bail, Context, Result};
use item_catalog_core::paginator::Locale;
use item_catalog_core::PagingStrategy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_resource")]
    pub resource: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            resource: default_resource(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_resource() -> String {
    "items".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct QueryConfig {
    #[serde(default)]
    pub paging: PagingStrategy,
    #[serde(default = "default_page_size")]
    pub default_page_size: i64,
    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<i64>,
    #[serde(default = "default_search_min_chars")]
    pub search_min_chars: usize,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            paging: PagingStrategy::default(),
            default_page_size: default_page_size(),
            page_size_options: default_page_size_options(),
            search_min_chars: default_search_min_chars(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl QueryConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_page_size() -> i64 {
    10
}
fn default_page_size_options() -> Vec<i64> {
    vec![5, 10, 25, 50]
}
fn default_search_min_chars() -> usize {
    3
}
fn default_debounce_ms() -> u64 {
    500
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// JSON array of items loaded into the store at start-up.
    #[serde(default)]
    pub seed: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            seed: None,
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct UiConfig {
    #[serde(default)]
    pub locale: Locale,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Built-in configuration used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// Collection URL, e.g. `http://localhost:3000/items`.
    pub fn items_url(&self) -> String {
        format!(
            "{}/{}",
            self.store.base_url.trim_end_matches('/'),
            self.store.resource.trim_matches('/')
        )
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;

    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`].
pub fn load_or_minimal(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::minimal())
    }
}

fn validate(config: &Config) -> Result<()> {
    // Validate store
    let base = config.store.base_url.as_str();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        bail!("store.base_url must start with http:// or https://");
    }
    if config.store.resource.trim_matches('/').is_empty() {
        bail!("store.resource must not be empty");
    }
    if config.store.timeout_secs == 0 {
        bail!("store.timeout_secs must be > 0");
    }

    // Validate query
    if config.query.default_page_size <= 0 {
        bail!("query.default_page_size must be > 0");
    }
    if config.query.page_size_options.iter().any(|&n| n <= 0) {
        bail!("query.page_size_options must all be > 0");
    }
    if !config.query.page_size_options.is_empty()
        && !config
            .query
            .page_size_options
            .contains(&config.query.default_page_size)
    {
        bail!(
            "query.default_page_size ({}) must be one of query.page_size_options {:?}",
            config.query.default_page_size,
            config.query.page_size_options
        );
    }

    Ok(())
}

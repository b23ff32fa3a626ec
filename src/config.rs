//! Configuration loading
//!
//! Settings come from a TOML file with environment overrides
//! (`SPREADWATCH_*`). Every section has usable defaults so a missing file
//! still yields a runnable config (minus Telegram delivery).

use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Absent = notifications disabled
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("SPREADWATCH").separator("__"))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }
}

/// Market data provider (CoinGecko-compatible API).
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Size of the shared top-assets universe
    #[serde(default = "default_top_assets_limit")]
    pub top_assets_limit: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            top_assets_limit: default_top_assets_limit(),
        }
    }
}

/// Scan engine cadence and fan-out.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_scan_interval")]
    pub interval_secs: u64,
    #[serde(default = "default_cache_refresh")]
    pub cache_refresh_secs: u64,
    /// Upper bound on concurrent ticker fetches within one cycle
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_fetches: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_scan_interval(),
            cache_refresh_secs: default_cache_refresh(),
            max_concurrent_fetches: default_max_concurrent(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
}

fn default_base_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_top_assets_limit() -> usize {
    100
}

fn default_scan_interval() -> u64 {
    60
}

fn default_cache_refresh() -> u64 {
    3600
}

fn default_max_concurrent() -> usize {
    8
}

fn default_db_path() -> String {
    "data/spreadwatch.db".to_string()
}

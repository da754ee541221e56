use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use config::{Config, ConfigError};
use tracing::debug;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub scraper: ScraperConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScraperConfig {
    pub base_url: String,
    /// Upper bound on review pages walked for one product.
    pub max_pages: u32,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub base_delay_ms: u64,
    /// Pause between consecutive review pages, jittered by half its value.
    pub page_delay_ms: u64,
    pub headers: HashMap<String, String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.ceneo.pl".to_string(),
            max_pages: 500,
            request_timeout_secs: 30,
            max_retries: 3,
            base_delay_ms: 1000,
            page_delay_ms: 0,
            headers: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;

        debug!(
            base_url = %settings.scraper.base_url,
            max_pages = settings.scraper.max_pages,
            data_dir = ?settings.storage.data_dir,
            headers = ?settings.scraper.headers,
            "Loaded settings"
        );

        Ok(settings)
    }
}

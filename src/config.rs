use crate::error::{PokedexError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const EMBEDDED_CONFIG: &str = include_str!("../config/config.toml");

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub listing: ListingConfig,
    pub search: SearchConfig,
    pub server: ServerConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// Request timeout in seconds. Absent means the transport default.
    #[serde(default)]
    pub timeout: Option<u64>,
    pub description_language: String,
    pub user_agent: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ListingConfig {
    pub page_size: usize,
    /// Page count reported for the unfiltered catalog.
    pub all_total_pages: usize,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SearchConfig {
    pub min_query_len: usize,
    pub debounce_ms: u64,
    pub suggestion_limit: usize,
    pub commit_limit: usize,
    pub candidate_pool: usize,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

impl Config {
    /// The defaults compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(EMBEDDED_CONFIG)
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str).map_err(|e| {
            tracing::error!("Failed to parse configuration: {}", e);
            PokedexError::from(e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML file, falling back to the embedded defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::info!("Loading configuration from {}", path.display());
                let config_str = std::fs::read_to_string(path).map_err(|e| {
                    PokedexError::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                Self::from_toml_str(&config_str)
            }
            None => Self::embedded(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.listing.page_size == 0 {
            return Err(PokedexError::Config("listing.page_size must be positive".into()));
        }
        if self.listing.all_total_pages == 0 {
            return Err(PokedexError::Config(
                "listing.all_total_pages must be positive".into(),
            ));
        }
        if self.search.candidate_pool == 0 {
            return Err(PokedexError::Config("search.candidate_pool must be positive".into()));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(PokedexError::Config("api.base_url must not be empty".into()));
        }
        Ok(())
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    /// Base URL without a trailing slash.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            all_total_pages: 50,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_len: 3,
            debounce_ms: 300,
            suggestion_limit: 5,
            commit_limit: 50,
            candidate_pool: 1000,
        }
    }
}

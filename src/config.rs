use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct QuoteProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RateProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub quote: Option<QuoteProviderConfig>,
    pub rates: Option<RateProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            quote: Some(QuoteProviderConfig {
                base_url: "https://api.aletheiaapi.com".to_string(),
            }),
            rates: Some(RateProviderConfig {
                base_url: "https://cdn.jsdelivr.net/gh/fawazahmed0/currency-api@1".to_string(),
            }),
        }
    }
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Ticker symbol recorded by the pipeline, as accepted by the quote provider.
    pub symbol: String,
    /// Target currencies; one converted price column exists per entry.
    pub currencies: Vec<String>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Quote provider API key. The STOCKWATCH_API_KEY environment variable wins.
    #[serde(default)]
    pub api_key: Option<String>,
    /// SQLite database file. Defaults to the platform data directory.
    #[serde(default)]
    pub database: Option<PathBuf>,
    /// Listening port for the HTTP API. The PORT environment variable wins.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "stockwatch")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_database_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "stockwatch")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().join("stockwatch.sqlite"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Database file from config, or the platform default with parents created.
    pub fn database_path(&self) -> Result<PathBuf> {
        let path = match &self.database {
            Some(path) => path.clone(),
            None => Self::default_database_path()?,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        Ok(path)
    }

    /// Secret key for the quote provider. Environment first, config fallback.
    pub fn quote_api_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var("STOCKWATCH_API_KEY")
            && !key.is_empty()
        {
            return Ok(key);
        }
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .context("Quote provider API key not set; export STOCKWATCH_API_KEY or add api_key to the config")
    }

    /// Listening port, with the PORT environment variable taking precedence so
    /// production deployments can pick the port without a config edit.
    pub fn listen_port(&self) -> u16 {
        std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(self.port)
    }
}

use anyhow::{Context, Result, ensure};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

/// Environment variable consulted when the config file has no api key.
pub const API_KEY_ENV: &str = "XRATES_API_KEY";

pub const DEFAULT_PROVIDER_URL: &str =
    "https://api.exchangeratesapi.io/v1/latest?access_key={apiKey}&symbols={code}";

/// What the provider returns when upstream has no rate for a code.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MissingRatePolicy {
    /// Return a rate of exactly 1 and keep going.
    #[default]
    Degrade,
    /// Return an error for the code.
    Fail,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    /// URL template with `{apiKey}` and `{code}` placeholders.
    #[serde(default = "default_provider_url")]
    pub url: String,
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub missing_rate: MissingRatePolicy,
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Api key from the config file, falling back to `XRATES_API_KEY`.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = &self.api_key {
            return Ok(key.clone());
        }
        std::env::var(API_KEY_ENV).with_context(|| {
            format!("No provider api_key configured and {API_KEY_ENV} is not set")
        })
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            url: default_provider_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            missing_rate: MissingRatePolicy::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RefreshConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_true")]
    pub on_startup: bool,
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        RefreshConfig {
            interval_secs: default_interval_secs(),
            on_startup: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            address: default_address(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_true")]
    pub persist: bool,
    pub data_path: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            persist: true,
            data_path: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            base_currency: default_base_currency(),
            server: ServerConfig::default(),
            provider: ProviderConfig::default(),
            refresh: RefreshConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

fn default_provider_url() -> String {
    DEFAULT_PROVIDER_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_interval_secs() -> u64 {
    60 * 60
}

fn default_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_base_currency() -> String {
    "EUR".to_string()
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "xrates", "xrates")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.storage.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "xrates", "xrates")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Rejects values that would stall the refresh loop or every fetch.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.refresh.interval_secs > 0,
            "refresh.interval_secs must be at least 1"
        );
        ensure!(
            self.provider.timeout_secs > 0,
            "provider.timeout_secs must be at least 1"
        );
        Ok(())
    }
}

/*
[INPUT]:  Optional YAML configuration file, EVENTPASS_* environment variables
[OUTPUT]: Parsed CLI configuration with defaults filled in
[POS]:    Configuration layer - backend, wallet and session settings
[UPDATE]: When adding new configuration options
*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use eventpass_wallet_auth::{ClientConfig, Endpoints, ProviderKind};
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "EVENTPASS";
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Top-level configuration for the eventpass CLI
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CliConfig {
    pub backend: BackendConfig,
    pub wallet: WalletConfig,
    pub session: SessionConfig,
}

/// Auth backend location and endpoint layout
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub endpoints: Endpoints,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            endpoints: Endpoints::default(),
        }
    }
}

/// Local keystore wallets
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Directory holding `<kind>_ed25519.key` files
    pub keystore_dir: PathBuf,
    /// Wallet to connect when none is given on the command line
    pub preferred: Option<ProviderKind>,
    /// Expose the petra key as a flagged `aptos` object instead of a bare one
    pub petra_flagged: bool,
    /// Wallets whose connection prompt is declined
    pub declined: Vec<ProviderKind>,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            keystore_dir: data_dir().join("keys"),
            preferred: None,
            petra_flagged: true,
            declined: Vec::new(),
        }
    }
}

/// Persisted session location
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    pub file: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            file: data_dir().join("session.json"),
        }
    }
}

/// `<data dir>/eventpass`, falling back to the working directory
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("eventpass")
}

/// `<config dir>/eventpass/config.yaml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("eventpass")
        .join(DEFAULT_CONFIG_FILE)
}

impl CliConfig {
    /// Load configuration layered as defaults, YAML file, then environment
    ///
    /// An explicit `path` must exist; the default location is optional.
    /// Environment keys use `EVENTPASS_` plus `__` between sections, e.g.
    /// `EVENTPASS_BACKEND__BASE_URL`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (default_config_path(), false),
        };

        let settings = Config::builder()
            .add_source(File::from(path.as_path()).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        settings
            .try_deserialize::<Self>()
            .context("invalid configuration")
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("failed to serialize config to YAML")
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.backend.timeout_secs),
            connect_timeout: Duration::from_secs(self.backend.connect_timeout_secs),
            endpoints: self.backend.endpoints.clone(),
        }
    }
}

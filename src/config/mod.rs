//! Configuration Module
//!
//! Handles application configuration loading, validation, and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Auth backend
    #[serde(default)]
    pub api: ApiConfig,

    /// Wallet providers and connection timing
    #[serde(default)]
    pub wallet: WalletConfig,

    /// Persisted session location
    #[serde(default)]
    pub session: SessionConfig,

    /// One-time password screen
    #[serde(default)]
    pub otp: OtpConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log to file
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the auth service; endpoints live under `/auth`
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_api_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            timeout_secs: default_api_timeout(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Give up on a provider that has not answered after this long
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// How long the success state stays on screen before auto-advancing
    #[serde(default = "default_success_display")]
    pub success_display_ms: u64,

    /// JSON-RPC endpoint for the MetaMask-style provider
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Interval between `eth_accounts` polls
    #[serde(default = "default_account_poll")]
    pub account_poll_secs: u64,

    #[serde(default = "default_simulated_latency")]
    pub simulated_latency_ms: u64,

    /// Probability in [0, 1] that a simulated provider approves
    #[serde(default = "default_simulated_success_rate")]
    pub simulated_success_rate: f64,
}

fn default_connect_timeout() -> u64 {
    45
}

fn default_success_display() -> u64 {
    2000
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_account_poll() -> u64 {
    4
}

fn default_simulated_latency() -> u64 {
    2000
}

fn default_simulated_success_rate() -> f64 {
    0.8
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            success_display_ms: default_success_display(),
            rpc_url: default_rpc_url(),
            account_poll_secs: default_account_poll(),
            simulated_latency_ms: default_simulated_latency(),
            simulated_success_rate: default_simulated_success_rate(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_path")]
    pub path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

fn default_session_path() -> PathBuf {
    vtrade_home().join("session.json")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpConfig {
    /// Seconds before "Resend code" becomes available again
    #[serde(default = "default_resend_secs")]
    pub resend_secs: u32,
}

fn default_resend_secs() -> u32 {
    30
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            resend_secs: default_resend_secs(),
        }
    }
}

/// Canonical base directory: `~/.vtrade/`
///
/// Config, session and logs live here.
pub fn vtrade_home() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".vtrade")
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. System config: ~/.vtrade/config.toml
    /// 3. Local config: ./vtrade.toml
    /// 4. Environment variables
    pub fn load() -> Result<Self> {
        tracing::debug!("Loading configuration...");

        let mut config = Self::default();

        let system_config_path = Self::system_config_path();
        if system_config_path.exists() {
            tracing::debug!("Loading system config from: {:?}", system_config_path);
            config = Self::merge_from_file(config, &system_config_path)?;
        }

        let local_config_path = Self::local_config_path();
        if local_config_path.exists() {
            tracing::debug!("Loading local config from: {:?}", local_config_path);
            config = Self::merge_from_file(config, &local_config_path)?;
        }

        config = Self::apply_env_overrides(config);

        tracing::debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from a specific file path
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. Custom config file (specified path)
    /// 3. Environment variables
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading configuration from custom path: {:?}", path);

        if !path.exists() {
            anyhow::bail!("Config file not found: {:?}", path);
        }
        let config = Self::merge_from_file(Self::default(), path)?;

        Ok(Self::apply_env_overrides(config))
    }

    /// Get the system config path: ~/.vtrade/config.toml
    pub fn system_config_path() -> PathBuf {
        vtrade_home().join("config.toml")
    }

    /// Get the local config path: ./vtrade.toml
    pub fn local_config_path() -> PathBuf {
        PathBuf::from("./vtrade.toml")
    }

    /// Load and merge configuration from a TOML file
    fn merge_from_file(base: Self, path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let file_config: toml::Value = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Self::merge(base, file_config)
            .with_context(|| format!("Invalid config file: {:?}", path))
    }

    /// Overlay the keys present in `overlay` onto `base`; absent keys keep
    /// the base value rather than resetting to the default.
    fn merge(base: Self, overlay: toml::Value) -> Result<Self> {
        let mut merged = toml::Value::try_from(&base).context("Failed to serialize config")?;
        merge_values(&mut merged, overlay);
        merged.try_into().context("Failed to apply config overlay")
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: Self) -> Self {
        if let Ok(log_level) = std::env::var("VTRADE_LOG_LEVEL") {
            config.logging.level = log_level;
        }

        if let Ok(log_file) = std::env::var("VTRADE_LOG_FILE") {
            config.logging.file = Some(PathBuf::from(log_file));
        }

        if let Ok(base_url) = std::env::var("VTRADE_API_URL") {
            config.api.base_url = base_url;
        }

        if let Ok(rpc_url) = std::env::var("VTRADE_RPC_URL") {
            config.wallet.rpc_url = rpc_url;
        }

        if let Ok(timeout) = std::env::var("VTRADE_WALLET_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => config.wallet.connect_timeout_secs = secs,
                Err(_) => tracing::warn!("Ignoring VTRADE_WALLET_TIMEOUT_SECS={}", timeout),
            }
        }

        if let Ok(path) = std::env::var("VTRADE_SESSION_PATH") {
            config.session.path = PathBuf::from(path);
        }

        config
    }

    pub fn validate(&self) -> Result<()> {
        tracing::debug!("Validating configuration...");

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            );
        }

        if self.api.base_url.trim().is_empty() {
            anyhow::bail!("api.base_url is empty");
        }
        if self.api.timeout_secs == 0 {
            anyhow::bail!("api.timeout_secs must be greater than zero");
        }

        if self.wallet.connect_timeout_secs == 0 {
            anyhow::bail!("wallet.connect_timeout_secs must be greater than zero");
        }
        if self.wallet.account_poll_secs == 0 {
            anyhow::bail!("wallet.account_poll_secs must be greater than zero");
        }
        if !(0.0..=1.0).contains(&self.wallet.simulated_success_rate) {
            anyhow::bail!(
                "wallet.simulated_success_rate must be between 0 and 1, got {}",
                self.wallet.simulated_success_rate
            );
        }

        if self.otp.resend_secs == 0 {
            anyhow::bail!("otp.resend_secs must be greater than zero");
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        tracing::info!("Configuration saved to: {:?}", path);
        Ok(())
    }
}

fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.wallet.connect_timeout_secs, 45);
        assert_eq!(config.wallet.success_display_ms, 2000);
        assert_eq!(config.otp.resend_secs, 30);
        assert!(config.session.path.ends_with("session.json"));
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_timeouts() {
        let mut config = Config::default();
        config.wallet.connect_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_success_rate_range() {
        let mut config = Config::default();
        config.wallet.simulated_success_rate = 1.5;
        assert!(config.validate().is_err());
        config.wallet.simulated_success_rate = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_content = r#"
[logging]
level = "debug"

[api]
base_url = "https://api.example.com"

[wallet]
connect_timeout_secs = 10
simulated_success_rate = 1.0
        "#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.wallet.connect_timeout_secs, 10);
        assert_eq!(config.wallet.success_display_ms, 2000);
        assert_eq!(config.otp, OtpConfig::default());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.wallet.rpc_url = "http://node:8545".into();

        config.save(temp_file.path()).unwrap();

        let contents = std::fs::read_to_string(temp_file.path()).unwrap();
        let loaded: Config = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_overlay_keeps_base_values() {
        let mut base = Config::default();
        base.api.base_url = "https://from-system".into();
        base.wallet.connect_timeout_secs = 5;

        let overlay: toml::Value = toml::from_str("[wallet]\nrpc_url = \"http://local\"").unwrap();
        let merged = Config::merge(base, overlay).unwrap();

        assert_eq!(merged.api.base_url, "https://from-system");
        assert_eq!(merged.wallet.connect_timeout_secs, 5);
        assert_eq!(merged.wallet.rpc_url, "http://local");
    }

    #[test]
    fn test_load_from_missing_path() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load_from_path(dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[wallet\nbroken").unwrap();
        assert!(Config::load_from_path(&path).is_err());
    }

    #[test]
    fn test_system_config_path() {
        let path = Config::system_config_path();
        assert!(path.to_string_lossy().contains(".vtrade"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn test_local_config_path() {
        assert_eq!(Config::local_config_path(), PathBuf::from("./vtrade.toml"));
    }
}

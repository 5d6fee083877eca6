//! Configuration module for subsync.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, SubsyncError};

/// Environment variable holding the access password.
pub const ENV_ACCESS_PASSWORD: &str = "ACCESS_PASSWORD";

/// Environment variable holding the runtime subscription descriptor string.
pub const ENV_SUBSCRIPTION_SOURCES: &str = "SUBSCRIPTION_SOURCES";

/// Fallback for [`ENV_SUBSCRIPTION_SOURCES`], as set by client-facing deployments.
pub const ENV_PUBLIC_SUBSCRIPTION_SOURCES: &str = "NEXT_PUBLIC_SUBSCRIPTION_SOURCES";

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/subsync.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Settings store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsConfig {
    /// Path to the JSON settings file.
    #[serde(default = "default_settings_path")]
    pub path: String,
}

fn default_settings_path() -> String {
    "data/settings.json".to_string()
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: default_settings_path(),
        }
    }
}

/// Subscription sync configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Endpoint serving the runtime config. When unset, the local
    /// `[access]` section is used instead.
    #[serde(default)]
    pub runtime_config_url: Option<String>,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Read timeout in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
    /// Maximum number of redirects.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Maximum subscription payload size in bytes.
    #[serde(default = "default_max_payload_size")]
    pub max_payload_size_bytes: u64,
    /// Allow subscription URLs that point at private or loopback hosts.
    #[serde(default)]
    pub allow_private_hosts: bool,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_read_timeout() -> u64 {
    20
}

fn default_total_timeout() -> u64 {
    30
}

fn default_max_redirects() -> usize {
    5
}

fn default_max_payload_size() -> u64 {
    2 * 1024 * 1024 // 2MB
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            runtime_config_url: None,
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            total_timeout_secs: default_total_timeout(),
            max_redirects: default_max_redirects(),
            max_payload_size_bytes: default_max_payload_size(),
            allow_private_hosts: false,
        }
    }
}

/// Access gate and runtime subscription configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessConfig {
    /// Access password. Empty means no password gate.
    #[serde(default)]
    pub password: String,
    /// Runtime subscription descriptor string.
    #[serde(default)]
    pub subscription_sources: String,
}

/// Web endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Whether the web endpoint is enabled.
    #[serde(default = "default_web_enabled")]
    pub enabled: bool,
    /// Host address to bind.
    #[serde(default = "default_web_host")]
    pub host: String,
    /// Port number.
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_web_enabled() -> bool {
    false
}

fn default_web_host() -> String {
    "0.0.0.0".to_string()
}

fn default_web_port() -> u16 {
    8080
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: default_web_enabled(),
            host: default_web_host(),
            port: default_web_port(),
            cors_origins: vec![],
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Settings store configuration.
    #[serde(default)]
    pub settings: SettingsConfig,
    /// Subscription sync configuration.
    #[serde(default)]
    pub sync: SyncConfig,
    /// Access gate configuration.
    #[serde(default)]
    pub access: AccessConfig,
    /// Web endpoint configuration.
    #[serde(default)]
    pub web: WebConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(SubsyncError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| SubsyncError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `ACCESS_PASSWORD`: access gate password
    /// - `SUBSCRIPTION_SOURCES`: runtime subscription descriptor string,
    ///   falling back to `NEXT_PUBLIC_SUBSCRIPTION_SOURCES` when unset or blank
    ///
    /// Empty values never override.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(password) = std::env::var(ENV_ACCESS_PASSWORD) {
            if !password.is_empty() {
                self.access.password = password;
            }
        }
        let sources = [ENV_SUBSCRIPTION_SOURCES, ENV_PUBLIC_SUBSCRIPTION_SOURCES]
            .into_iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty());
        if let Some(sources) = sources {
            self.access.subscription_sources = sources;
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the total sync timeout is zero
    /// - `runtime_config_url` is set but is not an http(s) URL
    pub fn validate(&self) -> Result<()> {
        if self.sync.total_timeout_secs == 0 {
            return Err(SubsyncError::Config(
                "sync.total_timeout_secs must be greater than zero".to_string(),
            ));
        }

        if let Some(raw) = &self.sync.runtime_config_url {
            let parsed = url::Url::parse(raw).map_err(|e| {
                SubsyncError::Config(format!("invalid sync.runtime_config_url: {e}"))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(SubsyncError::Config(format!(
                    "unsupported scheme for sync.runtime_config_url: {}",
                    parsed.scheme()
                )));
            }
        }

        Ok(())
    }
}

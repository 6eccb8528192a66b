//! Configuration module for azprov
//!
//! Handles loading and merging configuration from multiple sources:
//! - Default values
//! - System configuration (/etc/azprov/azprov.toml)
//! - User configuration (~/.azprov.toml)
//! - Project configuration (./azprov.toml)
//! - An explicit file (`--config` or `AZPROV_CONFIG`)
//! - Environment variables

use anyhow::{Context, Result};
use azprov::provider::azure::auth::DEFAULT_AUTHORITY_HOST;
use azprov::provider::azure::{AuthSource, DEFAULT_ENDPOINT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Azure Resource Manager settings
    pub azure: AzureConfig,

    /// Values used when a command leaves them out
    pub defaults: Defaults,

    /// Remote desktop client
    pub rdp: RdpConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Colors and output settings
    pub colors: ColorsConfig,
}

/// Azure Resource Manager settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    pub subscription_id: Option<String>,

    /// Bearer token; when unset one is acquired from `auth`
    pub access_token: Option<String>,

    /// Management endpoint
    pub endpoint: String,

    /// Where the bearer token comes from
    pub auth: AuthSource,

    /// OAuth2 authority for service principal logins
    pub authority_host: String,

    /// Per-request timeout in seconds
    pub request_timeout: u64,

    /// Upper bound for a long-running operation in seconds
    pub operation_timeout: u64,

    /// Seconds between polls of a long-running operation
    pub poll_interval: u64,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            subscription_id: None,
            access_token: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            auth: AuthSource::Auto,
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            request_timeout: 30,
            operation_timeout: 1800,
            poll_interval: 5,
        }
    }
}

impl std::fmt::Debug for AzureConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureConfig")
            .field("subscription_id", &self.subscription_id)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("endpoint", &self.endpoint)
            .field("auth", &self.auth)
            .field("authority_host", &self.authority_host)
            .field("request_timeout", &self.request_timeout)
            .field("operation_timeout", &self.operation_timeout)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl AzureConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }
}

/// Default configuration values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Region used when a command takes an optional location
    pub location: Option<String>,

    pub resource_group: Option<String>,

    pub admin_username: Option<String>,
}

/// Remote desktop client settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RdpConfig {
    /// Client program; the platform default when unset
    pub program: Option<String>,

    /// Client arguments; `{address}` is replaced by the VM address
    pub args: Vec<String>,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level used when no -v flag is given
    pub log_level: String,

    /// Emit logs as JSON lines
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json: false,
        }
    }
}

/// Colors and output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    /// Enable colors
    pub enabled: bool,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    /// Load configuration from all sources
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Config::default();

        for path in Self::get_config_paths() {
            if path.exists() {
                config = config.merge_from_file(&path)?;
            }
        }

        // An explicitly named file must exist
        if let Some(path) = config_path {
            config = config.merge_from_file(path)?;
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Get the list of implicit configuration file paths, lowest priority first
    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("/etc/azprov/azprov.toml")];

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".azprov.toml"));
        }

        paths.push(PathBuf::from("azprov.toml"));
        paths
    }

    /// Merge configuration from a file
    fn merge_from_file(&self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        // Determine format based on extension
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let file_config: Config = match extension {
            "yml" | "yaml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            _ => toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
        };

        Ok(self.merge(file_config))
    }

    /// Merge another config into this one; `other` wins wherever it differs
    /// from the defaults
    fn merge(&self, other: Config) -> Config {
        let base = AzureConfig::default();
        let log_default = LoggingConfig::default();

        Config {
            azure: AzureConfig {
                subscription_id: other
                    .azure
                    .subscription_id
                    .or_else(|| self.azure.subscription_id.clone()),
                access_token: other
                    .azure
                    .access_token
                    .or_else(|| self.azure.access_token.clone()),
                endpoint: if other.azure.endpoint != base.endpoint {
                    other.azure.endpoint
                } else {
                    self.azure.endpoint.clone()
                },
                auth: if other.azure.auth != base.auth {
                    other.azure.auth
                } else {
                    self.azure.auth
                },
                authority_host: if other.azure.authority_host != base.authority_host {
                    other.azure.authority_host
                } else {
                    self.azure.authority_host.clone()
                },
                request_timeout: if other.azure.request_timeout != base.request_timeout {
                    other.azure.request_timeout
                } else {
                    self.azure.request_timeout
                },
                operation_timeout: if other.azure.operation_timeout != base.operation_timeout {
                    other.azure.operation_timeout
                } else {
                    self.azure.operation_timeout
                },
                poll_interval: if other.azure.poll_interval != base.poll_interval {
                    other.azure.poll_interval
                } else {
                    self.azure.poll_interval
                },
            },
            defaults: Defaults {
                location: other
                    .defaults
                    .location
                    .or_else(|| self.defaults.location.clone()),
                resource_group: other
                    .defaults
                    .resource_group
                    .or_else(|| self.defaults.resource_group.clone()),
                admin_username: other
                    .defaults
                    .admin_username
                    .or_else(|| self.defaults.admin_username.clone()),
            },
            rdp: RdpConfig {
                program: other.rdp.program.or_else(|| self.rdp.program.clone()),
                args: if other.rdp.args.is_empty() {
                    self.rdp.args.clone()
                } else {
                    other.rdp.args
                },
            },
            logging: LoggingConfig {
                log_level: if other.logging.log_level != log_default.log_level {
                    other.logging.log_level
                } else {
                    self.logging.log_level.clone()
                },
                json: other.logging.json || self.logging.json,
            },
            colors: ColorsConfig {
                enabled: other.colors.enabled && self.colors.enabled,
            },
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(subscription) = std::env::var("AZURE_SUBSCRIPTION_ID") {
            self.azure.subscription_id = Some(subscription);
        }

        if let Ok(token) = std::env::var("AZURE_ACCESS_TOKEN") {
            self.azure.access_token = Some(token);
        }

        if let Ok(endpoint) = std::env::var("AZPROV_ENDPOINT") {
            self.azure.endpoint = endpoint;
        }

        if let Ok(location) = std::env::var("AZPROV_LOCATION") {
            self.defaults.location = Some(location);
        }

        if let Ok(client) = std::env::var("AZPROV_RDP_CLIENT") {
            self.rdp.program = Some(client);
        }

        if let Ok(level) = std::env::var("AZPROV_LOG_LEVEL") {
            self.logging.log_level = level;
        }

        if std::env::var("NO_COLOR").is_ok() {
            self.colors.enabled = false;
        }
    }

    /// Default region, if one is configured
    pub fn default_location(&self) -> Option<&str> {
        self.defaults.location.as_deref()
    }
}

//! Multi-tier TOML configuration for Campus.
//!
//! Reads configuration from multiple sources with precedence:
//! env vars > config file > defaults

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// The default backend base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://portal.campus.edu";

/// Default ceiling for read endpoints.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 10;

/// Default ceiling for the message-send path.
pub const DEFAULT_SEND_TIMEOUT_SECS: u64 = 15;

/// Resolved configuration for a Campus client.
#[derive(Debug, Clone)]
pub struct CampusConfig {
    pub base_url: String,
    pub data_dir: PathBuf,
    pub read_timeout: Duration,
    pub send_timeout: Duration,
}

/// Settings that can be read from a TOML config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSettings {
    pub base_url: Option<String>,
    pub read_timeout_secs: Option<u64>,
    pub send_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    pub data_dir: Option<PathBuf>,
}

/// Host-app overrides that take highest precedence.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub data_dir: Option<PathBuf>,
}

impl CampusConfig {
    /// Load configuration from all sources, applying precedence rules.
    ///
    /// Precedence (highest to lowest):
    /// 1. Host-app overrides
    /// 2. Environment variables
    /// 3. Config file (~/.campus/config.toml)
    /// 4. Defaults
    pub fn load(overrides: Overrides) -> Result<Self, campus_types::ConfigError> {
        let config_dir = config_dir();
        let settings = load_settings_file(&config_dir.join("config.toml"));
        Self::resolve(overrides, settings, config_dir)
    }

    fn resolve(
        overrides: Overrides,
        settings: SettingsFile,
        config_dir: PathBuf,
    ) -> Result<Self, campus_types::ConfigError> {
        let base_url = overrides
            .base_url
            .or_else(|| std::env::var("CAMPUS_API_BASE_URL").ok())
            .or(settings.api.base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        if base_url.trim().is_empty() {
            return Err(campus_types::ConfigError::InvalidValue {
                key: "base_url".into(),
                message: "must not be empty".into(),
            });
        }

        let data_dir = overrides
            .data_dir
            .or(settings.storage.data_dir)
            .unwrap_or_else(|| config_dir.join("data"));

        let read_timeout = settings
            .api
            .read_timeout_secs
            .unwrap_or(DEFAULT_READ_TIMEOUT_SECS);
        let send_timeout = settings
            .api
            .send_timeout_secs
            .unwrap_or(DEFAULT_SEND_TIMEOUT_SECS);
        if read_timeout == 0 || send_timeout == 0 {
            return Err(campus_types::ConfigError::InvalidValue {
                key: "timeout_secs".into(),
                message: "timeouts must be at least 1 second".into(),
            });
        }

        Ok(CampusConfig {
            base_url,
            data_dir,
            read_timeout: Duration::from_secs(read_timeout),
            send_timeout: Duration::from_secs(send_timeout),
        })
    }
}

/// Get the Campus config directory path (~/.campus/).
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CAMPUS_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".campus")
}

/// Load and parse a TOML settings file, returning defaults on any error.
fn load_settings_file(path: &std::path::Path) -> SettingsFile {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Failed to parse {}: {}", path.display(), e);
            SettingsFile::default()
        }),
        Err(_) => SettingsFile::default(),
    }
}

//! Client configuration management.
//!
//! Handles loading, saving, and accessing the client configuration: service
//! domain, API key, retry behaviour, pagination pacing, and logging.
//! Configuration is persisted as TOML on disk.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{CmsError, CmsResult};
use crate::platform::Platform;

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Service connection settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Pagination pacing settings.
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Service connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service subdomain (the `xxx` in `https://xxx.microcms.io`).
    #[serde(default)]
    pub service_domain: String,

    /// API key sent in the `X-MICROCMS-API-KEY` header.
    #[serde(default)]
    pub api_key: String,

    /// Retry transient failures (429, 5xx, network) up to two extra times.
    #[serde(default)]
    pub retry: bool,

    /// Draft key sent with every read request unless disabled per call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_draft_key: Option<String>,

    /// Origin override (scheme + host) replacing `https://{domain}.microcms.io`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

/// Pagination pacing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Records requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Page requests issued concurrently per packet by the batch collector.
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: usize,

    /// Minimum gap between the end of one packet and the next, in milliseconds.
    #[serde(default = "default_packet_interval")]
    pub packet_interval_ms: u64,

    /// Pause between pages of the sequential id collector, in milliseconds.
    #[serde(default = "default_page_delay")]
    pub page_delay_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. If empty, uses default location.
    #[serde(default)]
    pub directory: String,

    /// Enable JSON structured logging output.
    #[serde(default)]
    pub json_output: bool,
}

// Default value functions for serde

fn default_timeout() -> u64 {
    constants::DEFAULT_TIMEOUT_MS
}

fn default_page_size() -> u32 {
    constants::DEFAULT_PAGE_SIZE
}

fn default_requests_per_second() -> usize {
    constants::DEFAULT_REQUESTS_PER_SECOND
}

fn default_packet_interval() -> u64 {
    constants::PACKET_INTERVAL_MS
}

fn default_page_delay() -> u64 {
    constants::PAGE_DELAY_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_domain: String::new(),
            api_key: String::new(),
            retry: false,
            global_draft_key: None,
            base_url: None,
            timeout_ms: default_timeout(),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            requests_per_second: default_requests_per_second(),
            packet_interval_ms: default_packet_interval(),
            page_delay_ms: default_page_delay(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl ServiceConfig {
    /// Check that both the service domain and the API key are present.
    pub fn validate(&self) -> CmsResult<()> {
        if self.service_domain.trim().is_empty() || self.api_key.trim().is_empty() {
            return Err(CmsError::Config(
                "parameter is required (check serviceDomain and apiKey)".into(),
            ));
        }
        Ok(())
    }
}

impl PaginationConfig {
    /// Reject pacing values that would stall or never terminate.
    pub fn validate(&self) -> CmsResult<()> {
        if self.page_size == 0 {
            return Err(CmsError::Config("page_size must be greater than 0".into()));
        }
        if self.requests_per_second == 0 {
            return Err(CmsError::Config(
                "requests_per_second must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from the default config file path.
    pub fn load_default() -> CmsResult<Self> {
        let path = Self::default_config_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> CmsResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.pagination.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific file path.
    pub fn save_to_file(&self, path: &Path) -> CmsResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| CmsError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> CmsResult<PathBuf> {
        let config_dir = Platform::config_dir()?;
        Ok(config_dir.join("config.toml"))
    }

    /// Get the effective log directory, using the configured path or the default.
    pub fn effective_log_dir(&self) -> CmsResult<PathBuf> {
        if self.logging.directory.is_empty() {
            let data_dir = Platform::data_dir()?;
            Ok(data_dir.join("logs"))
        } else {
            Ok(PathBuf::from(&self.logging.directory))
        }
    }

    /// Check whether the service connection is configured.
    pub fn is_service_configured(&self) -> bool {
        self.service.validate().is_ok()
    }
}

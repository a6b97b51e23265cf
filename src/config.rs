//! Configuration management for zevermon
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files. Every section has defaults, so a file only
//! needs the values that differ.

use crate::error::{Result, ZeverError};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

mod defaults;

/// Default device address (the vendor's demo host)
pub const DEFAULT_BASE_URL: &str = "http://zeversolar.hms-srv.com";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Device connection configuration
    pub device: DeviceConfig,

    /// Interval between poll cycles in seconds
    pub poll_interval_secs: u64,

    /// IANA timezone deciding where a calendar day starts
    pub timezone: String,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Status API binding configuration
    pub web: WebConfig,
}

/// Device connection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Base URL of the monitoring device; `/home.cgi` is appended
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl DeviceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,

    /// Directory for daily-rotated log files; no file output when unset
    pub file: Option<String>,

    /// Number of rotated files to keep
    pub backup_count: u32,
}

/// Status API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Whether to serve the status API
    pub enabled: bool,

    /// Bind address
    pub host: String,

    /// TCP port
    pub port: u16,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        let default_paths = [
            "zevermon.yaml",
            "/data/zevermon.yaml",
            "/etc/zevermon/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        // Fall back to default configuration
        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Parsed [`Config::timezone`]
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| ZeverError::validation("timezone", e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        crate::fetcher::status_url(&self.device.base_url)?;

        if self.device.timeout_secs == 0 {
            return Err(ZeverError::validation(
                "device.timeout_secs",
                "Must be greater than 0",
            ));
        }

        if self.poll_interval_secs == 0 {
            return Err(ZeverError::validation(
                "poll_interval_secs",
                "Must be greater than 0",
            ));
        }

        // A cycle has to finish before the next tick
        if self.device.timeout_secs > self.poll_interval_secs {
            return Err(ZeverError::validation(
                "device.timeout_secs",
                "Must not exceed poll_interval_secs",
            ));
        }

        self.timezone()?;

        crate::logging::parse_log_level(&self.logging.level)
            .map_err(|e| ZeverError::validation("logging.level", e.to_string()))?;

        if self.web.enabled && self.web.port == 0 {
            return Err(ZeverError::validation(
                "web.port",
                "Port must be greater than 0",
            ));
        }

        Ok(())
    }
}

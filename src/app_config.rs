use anyhow::{Context, Result};
use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use url::Url;

use crate::errors::AppError;
use crate::subtitle_processor::ExportOptions;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Subtitle service connection
    #[serde(default)]
    pub service: ServiceConfig,

    /// Default SRT export options
    #[serde(default)]
    pub export: ExportOptions,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Subtitle service connection settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServiceConfig {
    // @field: Service base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: Timeout seconds, covering server-side processing
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Retries on connection failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    // @field: Base backoff, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching filter for the log facade
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    600 // transcription of long media takes minutes
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), AppError> {
        let endpoint = Url::parse(&self.service.endpoint)
            .map_err(|e| AppError::Config(format!("Invalid service endpoint '{}': {}", self.service.endpoint, e)))?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "Service endpoint must use http or https, got '{}'",
                endpoint.scheme()
            )));
        }

        if self.service.timeout_secs == 0 {
            return Err(AppError::Config("Service timeout must be greater than zero".to_string()));
        }

        if self.export.max_lines == 0 {
            return Err(AppError::Config("Export max_lines must be at least 1".to_string()));
        }

        if self.export.max_chars == 0 {
            return Err(AppError::Config("Export max_chars must be at least 1".to_string()));
        }

        Ok(())
    }

    /// Load the configuration at `path`, writing a default one there when
    /// the file does not exist yet
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path).context(format!("Failed to open config file: {:?}", path))?;
            let reader = BufReader::new(file);
            let config: Config =
                serde_json::from_reader(reader).context(format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json).context(format!("Failed to write config to file: {:?}", path))?;
        Ok(())
    }
}

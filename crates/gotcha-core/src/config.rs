//! Configuration management for Gotcha.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. Command-line flags are applied on top by
//! the binary.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/gotcha/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Probing behavior settings
    pub scanning: ScanningConfig,
    /// Report output settings
    pub output: OutputConfig,
    /// Platform catalog settings
    pub platforms: PlatformsConfig,
}

impl AppConfig {
    /// Load configuration from the default location, falling back to defaults
    /// if the file does not exist.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file. The file must exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `GOTCHA_CONCURRENCY`: Override the concurrency limit
    /// - `GOTCHA_TIMEOUT_SECS`: Override the per-probe timeout
    /// - `GOTCHA_USER_AGENT`: Override the HTTP user agent
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("GOTCHA_CONCURRENCY") {
            match val.parse::<usize>() {
                Ok(limit) if limit > 0 => {
                    self.scanning.concurrency_limit = limit;
                    tracing::debug!("Override scanning.concurrency_limit from env: {}", limit);
                }
                _ => tracing::warn!("Ignoring invalid GOTCHA_CONCURRENCY value: {}", val),
            }
        }

        if let Ok(val) = std::env::var("GOTCHA_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(secs) if secs > 0 => {
                    self.scanning.timeout_secs = secs;
                    tracing::debug!("Override scanning.timeout_secs from env: {}", secs);
                }
                _ => tracing::warn!("Ignoring invalid GOTCHA_TIMEOUT_SECS value: {}", val),
            }
        }

        if let Ok(val) = std::env::var("GOTCHA_USER_AGENT") {
            if !val.trim().is_empty() {
                self.scanning.user_agent = val;
                tracing::debug!("Override scanning.user_agent from env");
            }
        }

        self
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.scanning.concurrency_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scanning.concurrency_limit".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.scanning.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scanning.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.scanning.max_body_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scanning.max_body_bytes".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if matches!(self.scanning.scan_deadline_secs, Some(0)) {
            return Err(ConfigError::InvalidValue {
                field: "scanning.scan_deadline_secs".to_string(),
                reason: "must be greater than zero when set".to_string(),
            });
        }
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/gotcha/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "gotcha", "gotcha").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Probing behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanningConfig {
    /// Maximum number of probes in flight at once
    pub concurrency_limit: usize,
    /// Per-probe timeout in seconds
    pub timeout_secs: u64,
    /// Overall scan deadline in seconds; derived from the timeout when unset
    pub scan_deadline_secs: Option<u64>,
    /// Maximum number of response body bytes kept for classification
    pub max_body_bytes: usize,
    /// Maximum number of redirects followed per probe
    pub max_redirects: usize,
    /// User agent string
    pub user_agent: String,
}

impl ScanningConfig {
    /// Per-probe timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Explicit scan deadline, if configured.
    #[must_use]
    pub fn scan_deadline(&self) -> Option<Duration> {
        self.scan_deadline_secs.map(Duration::from_secs)
    }
}

impl Default for ScanningConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: 50,
            timeout_secs: 10,
            scan_deadline_secs: None,
            max_body_bytes: 256 * 1024,
            max_redirects: 5,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0"
                .to_string(),
        }
    }
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default report format: `json`, `csv`, or `txt`
    pub format: String,
    /// Include NOT_FOUND verdicts in text reports
    pub show_not_found: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            show_not_found: false,
        }
    }
}

/// Platform catalog settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformsConfig {
    /// Directory with additional platform definition TOML files
    pub extra_definitions_dir: Option<PathBuf>,
}

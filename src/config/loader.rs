//! Configuration file loading with precedence handling.

use crate::console::ConsoleSettings;
use crate::state::preferences::Platform;
use crate::stream::client::ReconnectPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "LOGFEED_CONFIG";

/// Environment variable overriding the dashboard base URL.
pub const URL_ENV: &str = "LOGFEED_URL";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// Config file parsed but a value is out of range.
    #[error("Invalid value for {field} in {path}: {reason}")]
    InvalidValue {
        /// Path of the offending file.
        path: PathBuf,
        /// Field name as written in the file.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/logfeed/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Dashboard base URL (e.g., "http://bjorn.local:8000").
    #[serde(default)]
    pub base_url: Option<String>,

    /// Start streaming on launch. Unset means ask the dashboard.
    #[serde(default)]
    pub autostart: Option<bool>,

    /// Delay before each reconnect, in milliseconds.
    #[serde(default)]
    pub reconnect_delay_ms: Option<u64>,

    /// Failed reconnects tolerated before giving up.
    #[serde(default)]
    pub max_reconnect_attempts: Option<u32>,

    /// Lines held while scrolled away from the bottom.
    #[serde(default)]
    pub buffer_capacity: Option<usize>,

    /// Lines kept in the rendered log.
    #[serde(default)]
    pub max_visible_lines: Option<usize>,

    /// Rows from the end still counted as "at bottom".
    #[serde(default)]
    pub bottom_threshold: Option<usize>,

    /// Scroll debounce, in milliseconds.
    #[serde(default)]
    pub scroll_debounce_ms: Option<u64>,

    /// Device class for the default font size.
    #[serde(default)]
    pub platform: Option<Platform>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Path to the preferences JSON file.
    #[serde(default)]
    pub preferences_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Dashboard base URL.
    pub base_url: String,
    /// Autostart override; `None` defers to the dashboard.
    pub autostart: Option<bool>,
    /// Reconnect delay in milliseconds.
    pub reconnect_delay_ms: u64,
    /// Reconnect budget.
    pub max_reconnect_attempts: u32,
    /// Unseen-lines buffer capacity.
    pub buffer_capacity: usize,
    /// Rendered log cap.
    pub max_visible_lines: usize,
    /// Bottom threshold in rows.
    pub bottom_threshold: usize,
    /// Scroll debounce in milliseconds.
    pub scroll_debounce_ms: u64,
    /// Device class.
    pub platform: Platform,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
    /// Preferences file; `None` uses the platform data directory.
    pub preferences_path: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            autostart: None,
            reconnect_delay_ms: 2000,
            max_reconnect_attempts: 5,
            buffer_capacity: 1000,
            max_visible_lines: 200,
            // One terminal row: the last line must actually be on screen
            bottom_threshold: 1,
            scroll_debounce_ms: 150,
            platform: Platform::Desktop,
            log_file_path: default_log_path(),
            preferences_path: None,
        }
    }
}

impl ResolvedConfig {
    /// Console tunables derived from this config.
    pub fn console_settings(&self) -> ConsoleSettings {
        ConsoleSettings {
            reconnect: ReconnectPolicy {
                delay: Duration::from_millis(self.reconnect_delay_ms),
                max_attempts: self.max_reconnect_attempts,
            },
            buffer_capacity: self.buffer_capacity,
            max_visible_lines: self.max_visible_lines,
            bottom_threshold: self.bottom_threshold,
            scroll_debounce: Duration::from_millis(self.scroll_debounce_ms),
            platform: self.platform,
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/logfeed/logfeed.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("logfeed").join("logfeed.log")
    } else {
        PathBuf::from("logfeed.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    validate(&config, &path)?;
    Ok(Some(config))
}

/// Reject values the console cannot honour.
///
/// Both caps must hold at least one line: a zero cap would evict the line
/// that was just appended.
fn validate(config: &ConfigFile, path: &Path) -> Result<(), ConfigError> {
    let caps = [
        ("buffer_capacity", config.buffer_capacity),
        ("max_visible_lines", config.max_visible_lines),
    ];
    for (field, value) in caps {
        if value == Some(0) {
            return Err(ConfigError::InvalidValue {
                path: path.to_path_buf(),
                field,
                reason: "must be at least 1".to_string(),
            });
        }
    }
    Ok(())
}

/// Resolve default config file path.
///
/// Returns `~/.config/logfeed/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("logfeed").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `LOGFEED_CONFIG` environment variable
/// 3. Default path `~/.config/logfeed/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        if env_path.is_empty() {
            return Err(ConfigError::InvalidPath(format!("{} is empty", CONFIG_ENV)));
        }
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `LOGFEED_URL`: Override base URL
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(url) = std::env::var(URL_ENV) {
        if !url.trim().is_empty() {
            config.base_url = url;
        }
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        base_url: config.base_url.unwrap_or(defaults.base_url),
        autostart: config.autostart.or(defaults.autostart),
        reconnect_delay_ms: config
            .reconnect_delay_ms
            .unwrap_or(defaults.reconnect_delay_ms),
        max_reconnect_attempts: config
            .max_reconnect_attempts
            .unwrap_or(defaults.max_reconnect_attempts),
        buffer_capacity: config.buffer_capacity.unwrap_or(defaults.buffer_capacity),
        max_visible_lines: config
            .max_visible_lines
            .unwrap_or(defaults.max_visible_lines),
        bottom_threshold: config.bottom_threshold.unwrap_or(defaults.bottom_threshold),
        scroll_debounce_ms: config
            .scroll_debounce_ms
            .unwrap_or(defaults.scroll_debounce_ms),
        platform: config.platform.unwrap_or(defaults.platform),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
        preferences_path: config.preferences_path.or(defaults.preferences_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    url_override: Option<String>,
    autostart_override: Option<bool>,
) -> ResolvedConfig {
    if let Some(url) = url_override {
        config.base_url = url;
    }

    if let Some(autostart) = autostart_override {
        config.autostart = Some(autostart);
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;

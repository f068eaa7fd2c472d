//! Configuration settings structures for infopush
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};
use crate::models::{ChannelConfig, ProviderKind};

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "infopush".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_error_log() -> String {
    "data/error.log".to_string()
}

fn default_provider_timeout() -> u64 {
    30
}

fn default_heartbeat_interval() -> u64 {
    60
}

fn default_heartbeat_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/infopush.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Server Configuration
// ============================================================================

/// Axum HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    /// Get the full server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// ============================================================================
// Push Gateway Configuration
// ============================================================================

/// Routing and dispatch settings shared by every channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushConfig {
    /// Global route prefix, e.g. "/" (no prefix) or "/push".
    ///
    /// There is no default: a configuration without a route is rejected.
    #[serde(default)]
    pub route: Option<String>,

    /// Append-only file receiving one line per failed push
    #[serde(default = "default_error_log")]
    pub error_log: String,

    /// Timeout in seconds for every outbound provider call
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            route: None,
            error_log: default_error_log(),
            provider_timeout: default_provider_timeout(),
        }
    }
}

// ============================================================================
// Heartbeat Configuration
// ============================================================================

/// Periodic liveness ping against an external URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatConfig {
    /// URL to GET on every tick; empty disables the heartbeat
    #[serde(default)]
    pub url: String,

    /// Interval between pings in seconds
    #[serde(default = "default_heartbeat_interval")]
    pub interval: u64,

    /// Timeout for a single ping in seconds
    #[serde(default = "default_heartbeat_timeout")]
    pub timeout: u64,
}

impl HeartbeatConfig {
    pub fn is_enabled(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            interval: default_heartbeat_interval(),
            timeout: default_heartbeat_timeout(),
        }
    }
}

// ============================================================================
// Channel Configuration
// ============================================================================

/// One `[[channels]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSettings {
    /// Channel name, used as the URL segment after the route prefix
    pub name: String,

    /// Provider kind tag, e.g. "wecom_robot_text"
    pub kind: ProviderKind,

    /// Provider-specific keys (tokens, secrets, chat ids)
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

impl From<ChannelSettings> for ChannelConfig {
    fn from(settings: ChannelSettings) -> Self {
        ChannelConfig::new(settings.name, settings.kind, settings.config)
    }
}

// ============================================================================
// Logger Settings
// ============================================================================

/// Console output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            colored: default_true(),
        }
    }
}

/// File output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_path")]
    pub path: String,

    #[serde(default = "default_true")]
    pub append: bool,

    /// Log format: "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: default_true(),
            format: default_log_format(),
        }
    }
}

/// Logger configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub console: ConsoleSettings,

    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert LoggerSettings into the logger's runtime configuration
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let console_config = ConsoleConfig::new(self.console.enabled, self.console.colored);
        let file_config = self.file.into_file_config()?;

        LoggerConfig::new(console_config, file_config, self.level)
            .map_err(|e| ConfigError::validation("logger", e.to_string()))
    }
}

impl FileSettings {
    /// Convert FileSettings to FileConfig
    pub fn into_file_config(self) -> Result<FileConfig, ConfigError> {
        let format = self
            .format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::validation("logger.file.format", e.to_string()))?;

        FileConfig::new(self.enabled, PathBuf::from(self.path), self.append, format)
            .map_err(|e| ConfigError::validation("logger.file", e.to_string()))
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub push: PushConfig,

    #[serde(default)]
    pub heartbeat: HeartbeatConfig,

    #[serde(default)]
    pub logger: LoggerSettings,

    /// Channels in declaration order
    #[serde(default)]
    pub channels: Vec<ChannelSettings>,
}

impl Settings {
    /// Channel rows ready for the channel store, in declaration order
    pub fn channel_configs(&self) -> Vec<ChannelConfig> {
        self.channels.iter().cloned().map(ChannelConfig::from).collect()
    }
}

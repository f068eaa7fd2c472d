//! Configuration validation logic
//!
//! Runs after deserialization so that a bad configuration stops the process
//! before the listener is bound.

use std::collections::HashSet;

use crate::config::error::ConfigError;
use crate::config::settings::{
    ChannelSettings, FileSettings, HeartbeatConfig, LoggerSettings, PushConfig, ServerConfig,
    Settings,
};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

impl ServerConfig {
    /// Validate server configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::validation(
                "server.host",
                "Host address is required.",
            ));
        }

        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        Ok(())
    }
}

impl PushConfig {
    /// Validate push gateway configuration
    ///
    /// # Validation Rules
    /// - `route` must be present and non-empty ("/" means no prefix)
    /// - `error_log` must not be empty
    /// - `provider_timeout` must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.route.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(ConfigError::validation(
                    "push.route",
                    "The global route is missing or empty. Set it in the [push] section, \
                     e.g. route = \"/\" (no prefix) or route = \"/push\" (with prefix).",
                ));
            }
            Some(_) => {}
        }

        if self.error_log.trim().is_empty() {
            return Err(ConfigError::validation(
                "push.error_log",
                "Error log path cannot be empty.",
            ));
        }

        if self.provider_timeout == 0 {
            return Err(ConfigError::validation(
                "push.provider_timeout",
                "Provider timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl HeartbeatConfig {
    /// Validate heartbeat configuration; only checked when a URL is set
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.is_enabled() {
            return Ok(());
        }

        let url = self.url.trim();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::ValidationError {
                field: "heartbeat.url".to_string(),
                message: format!("Heartbeat URL must use http or https, got '{}'", url),
            });
        }

        if self.interval == 0 {
            return Err(ConfigError::validation(
                "heartbeat.interval",
                "Heartbeat interval must be greater than 0 seconds.",
            ));
        }

        if self.timeout == 0 {
            return Err(ConfigError::validation(
                "heartbeat.timeout",
                "Heartbeat timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        self.file.validate()
    }
}

/// Channel names must be non-empty path segments and unique.
fn validate_channels(channels: &[ChannelSettings]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for (index, channel) in channels.iter().enumerate() {
        let name = channel.name.trim_matches('/');
        if name.is_empty() {
            return Err(ConfigError::ValidationError {
                field: format!("channels[{}].name", index),
                message: "Channel name cannot be empty.".to_string(),
            });
        }

        if name != channel.name {
            return Err(ConfigError::ValidationError {
                field: format!("channels[{}].name", index),
                message: format!(
                    "Channel name '{}' must not start or end with '/'.",
                    channel.name
                ),
            });
        }

        if !seen.insert(name) {
            return Err(ConfigError::ValidationError {
                field: format!("channels[{}].name", index),
                message: format!("Duplicate channel name '{}'.", channel.name),
            });
        }
    }

    Ok(())
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// Returns the first validation error encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.push.validate()?;
        self.heartbeat.validate()?;
        self.logger.validate()?;
        validate_channels(&self.channels)?;
        Ok(())
    }
}

//! Configuration loader for infopush
//!
//! This module provides the `ConfigLoader` struct that handles loading
//! configuration from multiple sources with proper precedence.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
const CONFIG_DIR_ENV: &str = "INFOPUSH_CONFIG_DIR";

/// Environment variable for specific configuration file
const CONFIG_FILE_ENV: &str = "INFOPUSH_CONFIG_FILE";

/// Default configuration directory
const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "INFOPUSH";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Configuration loader that handles layered configuration loading
///
/// Sources, lowest priority first:
/// 1. `default.toml` (required)
/// 2. `{environment}.toml` (optional)
/// 3. `local.toml` (optional)
/// 4. `INFOPUSH_*` environment variables
///
/// A single file can replace the three file layers, either through
/// `INFOPUSH_CONFIG_FILE` or [`ConfigLoader::from_file`].
#[derive(Debug)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Create a loader from `INFOPUSH_CONFIG_DIR`, `INFOPUSH_CONFIG_FILE` and
    /// `INFOPUSH_APP_ENV`.
    ///
    /// # Errors
    ///
    /// Returns an error if both `INFOPUSH_CONFIG_DIR` and `INFOPUSH_CONFIG_FILE`
    /// are set.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::var(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_DIR));

        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_file.is_some() && std::env::var(CONFIG_DIR_ENV).is_ok() {
            return Err(ConfigError::mutual_exclusivity(
                "INFOPUSH_CONFIG_DIR and INFOPUSH_CONFIG_FILE cannot both be set. \
                 Use INFOPUSH_CONFIG_DIR for layered configuration or \
                 INFOPUSH_CONFIG_FILE for a single configuration file.",
            ));
        }

        Ok(Self {
            config_dir,
            config_file,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Create a loader reading a single configuration file plus env overrides
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            config_file: Some(path.into()),
            environment: AppEnvironment::from_env(),
        }
    }

    /// Override the environment used to pick the `{environment}.toml` overlay
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    /// Load and validate configuration from all sources
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        let settings: Settings = config.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })?;

        settings.validate()?;

        Ok(settings)
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = if let Some(ref config_file) = self.config_file {
            Self::add_file_source(builder, config_file, true)?
        } else {
            self.build_layered_config(builder)?
        };

        // INFOPUSH_SERVER__PORT -> server.port
        let builder = Self::add_env_source(builder);

        builder.build().map_err(ConfigError::from)
    }

    fn build_layered_config(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let default_path = self.config_dir.join("default.toml");
        let builder = Self::add_file_source(builder, &default_path, true)?;

        let env_path = self
            .config_dir
            .join(format!("{}.toml", self.environment.as_str()));
        let builder = Self::add_file_source(builder, &env_path, false)?;

        let local_path = self.config_dir.join("local.toml");
        Self::add_file_source(builder, &local_path, false)
    }

    fn add_file_source(
        builder: ConfigBuilder<DefaultState>,
        path: &Path,
        required: bool,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        if required && !path.exists() {
            return Err(ConfigError::file_not_found(format!(
                "Required configuration file not found: {}",
                path.display()
            )));
        }

        Ok(builder.add_source(
            File::new(&path.to_string_lossy(), FileFormat::Toml).required(required),
        ))
    }

    fn add_env_source(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        )
    }
}

/// Held by every test that reads or writes `INFOPUSH_*` variables
#[cfg(test)]
pub(crate) static TEST_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProviderKind;
    use std::fs;
    use tempfile::TempDir;

    fn setup_config_dir(files: &[(&str, &str)]) -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        for (name, content) in files {
            fs::write(temp_dir.path().join(name), content).expect("Failed to write config file");
        }
        temp_dir
    }

    /// Restores touched environment variables on drop
    struct EnvGuard {
        vars_to_restore: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            Self {
                vars_to_restore: Vec::new(),
            }
        }

        fn set(&mut self, key: &str, value: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::set_var(key, value);
            }
        }

        fn remove(&mut self, key: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::remove_var(key);
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, original_value) in self.vars_to_restore.iter().rev() {
                unsafe {
                    match original_value {
                        Some(value) => std::env::set_var(key, value),
                        None => std::env::remove_var(key),
                    }
                }
            }
        }
    }

    const DEFAULT_TOML: &str = r#"
[server]
host = "127.0.0.1"
port = 8080

[push]
route = "/push"

[[channels]]
name = "alerts"
kind = "wecom_robot_text"
[channels.config]
key = "robot-key"
"#;

    #[test]
    fn test_config_loader_mutual_exclusivity_error() {
        let _lock = TEST_ENV_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.set(CONFIG_DIR_ENV, "/custom/config");
        env.set(CONFIG_FILE_ENV, "/path/to/config.toml");

        match ConfigLoader::new() {
            Err(ConfigError::MutualExclusivityError(msg)) => {
                assert!(msg.contains(CONFIG_DIR_ENV));
                assert!(msg.contains(CONFIG_FILE_ENV));
            }
            other => panic!("Expected MutualExclusivityError, got {other:?}"),
        }
    }

    #[test]
    fn test_load_missing_default_toml() {
        let _lock = TEST_ENV_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        let temp_dir = setup_config_dir(&[]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());
        env.remove(CONFIG_FILE_ENV);

        let result = ConfigLoader::new().unwrap().load();
        assert!(matches!(result, Err(ConfigError::FileNotFound(msg)) if msg.contains("default.toml")));
    }

    #[test]
    fn test_load_layered_with_environment_overlay() {
        let _lock = TEST_ENV_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        let temp_dir = setup_config_dir(&[
            ("default.toml", DEFAULT_TOML),
            ("production.toml", "[server]\nport = 9090\n"),
        ]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());
        env.remove(CONFIG_FILE_ENV);

        let settings = ConfigLoader::new()
            .unwrap()
            .with_environment(AppEnvironment::Production)
            .load()
            .expect("Should load");

        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.push.route.as_deref(), Some("/push"));
        assert_eq!(settings.channels.len(), 1);
        assert_eq!(settings.channels[0].kind, ProviderKind::WecomRobotText);
        assert_eq!(
            settings.channels[0].config.get("key").map(String::as_str),
            Some("robot-key")
        );
    }

    #[test]
    fn test_env_var_overrides_file() {
        let _lock = TEST_ENV_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        let temp_dir = setup_config_dir(&[("infopush.toml", DEFAULT_TOML)]);
        env.set("INFOPUSH_PUSH__ROUTE", "/notify");

        let settings = ConfigLoader::from_file(temp_dir.path().join("infopush.toml"))
            .load()
            .expect("Should load");
        assert_eq!(settings.push.route.as_deref(), Some("/notify"));
    }

    #[test]
    fn test_load_without_route_fails_validation() {
        let _lock = TEST_ENV_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.remove("INFOPUSH_PUSH__ROUTE");
        let temp_dir = setup_config_dir(&[("infopush.toml", "[server]\nport = 8080\n")]);

        let result = ConfigLoader::from_file(temp_dir.path().join("infopush.toml")).load();
        assert!(
            matches!(result, Err(ConfigError::ValidationError { field, .. }) if field == "push.route")
        );
    }

    #[test]
    fn test_unknown_kind_fails_to_parse() {
        let _lock = TEST_ENV_MUTEX.lock().unwrap();
        let temp_dir = setup_config_dir(&[(
            "infopush.toml",
            "[push]\nroute = \"/\"\n[[channels]]\nname = \"x\"\nkind = \"fax\"\n",
        )]);

        let result = ConfigLoader::from_file(temp_dir.path().join("infopush.toml")).load();
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}

//! Configuration merger for CLI arguments and config files
//!
//! CLI arguments have the highest priority, then environment variables, then
//! configuration files.

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, Settings};

pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Load the base configuration selected by `--config` and `--env`
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let loader = match &cli.config {
            Some(path) => ConfigLoader::from_file(path),
            None => ConfigLoader::new()?,
        };

        let loader = match cli.env {
            Some(env) => loader.with_environment(env.into()),
            None => loader,
        };

        Ok(Self::new(loader.load()?))
    }

    /// Apply CLI overrides to the base configuration and re-validate
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        if let Some(Commands::Serve {
            host,
            port,
            log_level,
            dry_run: _,
        }) = &cli.command
        {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
            // Command-level log level beats the global flags
            if let Some(level) = log_level {
                config.logger.level = (*level).into();
            }
        }

        config.validate()?;

        Ok(config)
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn base_config() -> Settings {
        let mut config = Settings::default();
        config.push.route = Some("/push".to_string());
        config
    }

    fn merge(args: &[&str]) -> Settings {
        let cli = Cli::try_parse_from(args).unwrap();
        ConfigurationMerger::new(base_config())
            .merge_cli_args(&cli)
            .unwrap()
    }

    #[test]
    fn test_verbose_and_quiet_flags() {
        assert_eq!(merge(&["infopush", "--verbose"]).logger.level, "debug");
        assert_eq!(merge(&["infopush", "--quiet"]).logger.level, "error");
        assert_eq!(merge(&["infopush"]).logger.level, "info");
    }

    #[test]
    fn test_serve_overrides() {
        let config = merge(&["infopush", "serve", "--host", "127.0.0.1", "--port", "9000"]);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_command_log_level_overrides_global() {
        let config = merge(&["infopush", "--verbose", "serve", "--log-level", "warn"]);
        assert_eq!(config.logger.level, "warn");
    }

    #[test]
    fn test_merge_revalidates() {
        let cli = Cli::try_parse_from(["infopush", "serve"]).unwrap();
        let result = ConfigurationMerger::new(Settings::default()).merge_cli_args(&cli);
        assert!(
            matches!(result, Err(ConfigError::ValidationError { field, .. }) if field == "push.route")
        );
    }

    #[test]
    fn test_from_cli_with_config_file() {
        let _lock = crate::config::loader::TEST_ENV_MUTEX.lock().unwrap();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[push]\nroute = \"/\"\n\n[[channels]]\nname = \"ops\"\nkind = \"telegram_text\"\n"
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "infopush",
            "--config",
            file.path().to_str().unwrap(),
            "channels",
        ])
        .unwrap();

        let merger = ConfigurationMerger::from_cli(&cli).unwrap();
        assert_eq!(merger.config().push.route.as_deref(), Some("/"));
        assert_eq!(merger.config().channels[0].name, "ops");
    }
}

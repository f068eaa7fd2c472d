//! CLI argument parsing with clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Multi-provider push notification gateway
#[derive(Parser, Debug)]
#[command(name = "infopush")]
#[command(about = "Multi-provider push notification gateway")]
#[command(long_about = "
infopush accepts simple HTTP push requests and forwards them to DingTalk,
Telegram or WeCom channels defined in its configuration file.

EXAMPLES:
    # Start the gateway with the layered configuration in ./config
    infopush serve

    # Use a single configuration file
    infopush --config /etc/infopush/infopush.toml serve

    # Override the listen address
    infopush serve --host 127.0.0.1 --port 9000

    # Check configuration without starting the server
    infopush serve --dry-run

    # List every configured push URL
    infopush channels

    # Send a message once running
    curl 'http://localhost:8080/push/alerts?msg=hello&title=Deploy'
")]
#[command(version = crate::clap_long_version())]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Load this single TOML file instead of the layered files in the
    /// configuration directory. INFOPUSH_* environment variables still apply.
    ///
    /// Example: --config /etc/infopush/infopush.toml
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects the `{environment}.toml` overlay.
    /// Available values: development (dev), production (prod), test
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output; push result lines are still printed
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the push gateway (default)
    ///
    /// Examples:
    ///   infopush serve                           # Start with defaults
    ///   infopush serve --host 0.0.0.0 --port 80  # Bind to all interfaces on port 80
    ///   infopush serve --dry-run                 # Validate config without starting
    Serve {
        /// Host address to bind to
        #[arg(long, value_name = "ADDRESS", value_parser = super::validation::validate_host_address)]
        host: Option<String>,

        /// Port number to listen on
        #[arg(short, long, value_name = "PORT", value_parser = super::validation::validate_port)]
        port: Option<u16>,

        /// Log level override, takes precedence over --verbose/--quiet
        #[arg(short, long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration and print the route table without serving
        #[arg(long)]
        dry_run: bool,
    },

    /// Print every configured channel with its push URL and provider kind
    Channels,
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "production", alias = "prod")]
    Production,
    #[value(name = "test")]
    Test,
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl Cli {
    /// The command to run; no subcommand means `serve` with defaults
    pub fn resolved_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve {
            host: None,
            port: None,
            log_level: None,
            dry_run: false,
        })
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
        .to_string()
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Production => crate::config::Environment::Production,
            Environment::Test => crate::config::Environment::Test,
        }
    }
}

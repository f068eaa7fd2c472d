//! Serve command handler
//!
//! Handles the serve command including dry-run validation and server startup.

use std::sync::Arc;

use crate::config::Settings;
use crate::error::AppResult;
use crate::external::ReqwestTransport;
use crate::server::{Components, Server, route_table};

pub struct ServeCommandHandler {
    config: Settings,
}

impl ServeCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    pub async fn execute(self, dry_run: bool) -> AppResult<()> {
        if dry_run {
            return self.validate_only();
        }

        Server::new(self.config).run().await?;
        Ok(())
    }

    /// Validate configuration and channel wiring without binding
    pub fn validate_only(&self) -> AppResult<()> {
        self.config.validate()?;

        let transport = ReqwestTransport::new()?;
        let components = Components::build(&self.config, Arc::new(transport))?;

        println!("✓ Configuration is valid");
        println!("✓ Server would bind to: {}", self.config.server.address());
        println!("✓ Route prefix: {}", components.store.route());
        println!("✓ Error log: {}", components.error_log.path().display());
        if self.config.heartbeat.is_enabled() {
            println!(
                "✓ Heartbeat: {} every {}s",
                self.config.heartbeat.url, self.config.heartbeat.interval
            );
        }
        println!("✓ {} channel(s):", components.store.channels().len());
        for line in route_table(&self.config, &components.store) {
            println!("    {}", line);
        }

        println!("Dry run completed successfully - configuration is ready for deployment");
        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::ChannelSettings;
    use crate::models::ProviderKind;

    fn valid_config() -> Settings {
        let mut config = Settings::default();
        config.push.route = Some("/push".to_string());
        config.channels = vec![ChannelSettings {
            name: "alerts".to_string(),
            kind: ProviderKind::WecomRobotText,
            config: [("key".to_string(), "k".to_string())].into_iter().collect(),
        }];
        config
    }

    #[tokio::test]
    async fn test_serve_handler_dry_run() {
        let handler = ServeCommandHandler::new(valid_config());
        assert!(handler.execute(true).await.is_ok());
    }

    #[tokio::test]
    async fn test_serve_handler_dry_run_invalid_config() {
        let mut config = valid_config();
        config.server.port = 0;
        let handler = ServeCommandHandler::new(config);
        assert!(handler.execute(true).await.is_err());
    }

    #[test]
    fn test_serve_handler_dry_run_missing_route() {
        let mut config = valid_config();
        config.push.route = None;
        assert!(ServeCommandHandler::new(config).validate_only().is_err());
    }
}

//! Channels command handler: prints the push URL of every channel.

use std::sync::Arc;

use crate::config::Settings;
use crate::error::AppResult;
use crate::external::ReqwestTransport;
use crate::server::{Components, route_table};

pub struct ChannelsCommandHandler {
    config: Settings,
}

impl ChannelsCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> AppResult<()> {
        for line in self.lines()? {
            println!("{}", line);
        }
        Ok(())
    }

    fn lines(&self) -> AppResult<Vec<String>> {
        let transport = ReqwestTransport::new()?;
        let components = Components::build(&self.config, Arc::new(transport))?;

        let mut lines = vec![format!("Route prefix: {}", components.store.route())];
        if components.store.channels().is_empty() {
            lines.push("No channels configured".to_string());
        }
        lines.extend(route_table(&self.config, &components.store));
        Ok(lines)
    }
}

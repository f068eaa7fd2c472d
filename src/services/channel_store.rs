//! Read-only store of the global route and every configured channel.

use std::collections::HashMap;

use crate::config::error::ConfigError;
use crate::models::ChannelConfig;
use crate::services::notifications::ProviderRegistry;

/// Global route prefix plus channels in declaration order.
///
/// Built once at startup and shared behind an `Arc`; there is no mutating API,
/// so concurrent readers need no locking.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    route: String,
    channels: Vec<ChannelConfig>,
    index: HashMap<String, usize>,
}

impl ConfigStore {
    /// Build the store.
    ///
    /// # Errors
    /// - the route is empty (use "/" for no prefix)
    /// - two channels share a name
    pub fn new(route: impl Into<String>, channels: Vec<ChannelConfig>) -> Result<Self, ConfigError> {
        let route = route.into();
        if route.trim().is_empty() {
            return Err(ConfigError::validation(
                "push.route",
                "The global route is missing or empty.",
            ));
        }

        let mut index = HashMap::with_capacity(channels.len());
        for (position, channel) in channels.iter().enumerate() {
            if index.insert(channel.name().to_string(), position).is_some() {
                return Err(ConfigError::validation(
                    "channels",
                    format!("Duplicate channel name '{}'.", channel.name()),
                ));
            }
        }

        Ok(Self {
            route,
            channels,
            index,
        })
    }

    /// Check every channel's kind against the adapters actually registered
    pub fn verify_providers(&self, registry: &ProviderRegistry) -> Result<(), ConfigError> {
        match self.channels.iter().find(|c| !registry.supports(c.kind())) {
            Some(channel) => Err(ConfigError::validation(
                format!("channels.{}.kind", channel.name()),
                format!("No provider registered for kind '{}'.", channel.kind()),
            )),
            None => Ok(()),
        }
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    /// True when the route adds no prefix ("/" or only separators)
    pub fn is_root_route(&self) -> bool {
        self.route.trim_matches('/').is_empty()
    }

    pub fn resolve(&self, name: &str) -> Option<&ChannelConfig> {
        self.index.get(name).map(|&i| &self.channels[i])
    }

    /// Channel names in declaration order
    pub fn all_names(&self) -> Vec<&str> {
        self.channels.iter().map(ChannelConfig::name).collect()
    }

    pub fn channels(&self) -> &[ChannelConfig] {
        &self.channels
    }

    /// Public path of a channel relative to the server root, e.g. `push/alerts`
    pub fn route_path(&self, channel: &ChannelConfig) -> String {
        if self.is_root_route() {
            channel.name().to_string()
        } else {
            format!("{}/{}", self.route.trim_matches('/'), channel.name())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProviderConfig, ProviderKind};

    fn channel(name: &str, kind: ProviderKind) -> ChannelConfig {
        ChannelConfig::new(name, kind, ProviderConfig::default())
    }

    #[test]
    fn test_resolve_and_order() {
        let store = ConfigStore::new(
            "/push",
            vec![
                channel("zeta", ProviderKind::TelegramText),
                channel("alpha", ProviderKind::DingtalkText),
            ],
        )
        .unwrap();

        assert_eq!(store.all_names(), vec!["zeta", "alpha"]);
        assert_eq!(
            store.resolve("alpha").map(ChannelConfig::kind),
            Some(ProviderKind::DingtalkText)
        );
        assert!(store.resolve("beta").is_none());
    }

    #[test]
    fn test_empty_route_rejected() {
        assert!(ConfigStore::new("", vec![]).is_err());
        assert!(ConfigStore::new("  ", vec![]).is_err());
        assert!(ConfigStore::new("/", vec![]).is_ok());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = ConfigStore::new(
            "/",
            vec![
                channel("a", ProviderKind::TelegramText),
                channel("a", ProviderKind::WecomMpnews),
            ],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_route_path() {
        let alerts = channel("alerts", ProviderKind::WecomRobotText);
        let store = ConfigStore::new("/push/", vec![alerts.clone()]).unwrap();
        assert_eq!(store.route_path(&alerts), "push/alerts");

        let store = ConfigStore::new("/", vec![alerts.clone()]).unwrap();
        assert!(store.is_root_route());
        assert_eq!(store.route_path(&alerts), "alerts");
    }

    #[test]
    fn test_verify_providers() {
        let store = ConfigStore::new("/", vec![channel("a", ProviderKind::TelegramText)]).unwrap();

        assert!(store.verify_providers(&ProviderRegistry::new()).is_err());

        let transport = std::sync::Arc::new(crate::external::testing::RecordingTransport::replying(""));
        let registry =
            ProviderRegistry::with_builtin(transport, std::time::Duration::from_secs(1));
        assert!(store.verify_providers(&registry).is_ok());
    }
}

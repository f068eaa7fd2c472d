//! Maps an inbound request path to a configured channel.

use std::sync::Arc;

use crate::models::ChannelConfig;
use crate::services::channel_store::ConfigStore;
use crate::services::error::RouteError;

const SEPARATOR: char = '/';

/// Pure path resolution over the read-only [`ConfigStore`]
#[derive(Debug, Clone)]
pub struct ChannelRouter {
    store: Arc<ConfigStore>,
}

impl ChannelRouter {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }

    /// Resolve `path` (already percent-decoded) to its channel.
    ///
    /// Leading and trailing separators are ignored on both the path and the
    /// route. The prefix only matches on a separator boundary, so with route
    /// `/push` the path `/pushfoo` is rejected rather than resolved to `foo`.
    pub fn route(&self, path: &str) -> Result<&ChannelConfig, RouteError> {
        let name = self.channel_name(path)?;

        self.store
            .resolve(name)
            .ok_or_else(|| RouteError::UnknownChannel {
                name: name.to_string(),
                known: self.store.all_names().into_iter().map(String::from).collect(),
            })
    }

    /// Channel segment of `path`, without the lookup
    pub fn channel_name<'p>(&self, path: &'p str) -> Result<&'p str, RouteError> {
        let trimmed = path.trim_matches(SEPARATOR);

        let name = if self.store.is_root_route() {
            trimmed
        } else {
            let prefix = format!("{}{}", self.store.route().trim_matches(SEPARATOR), SEPARATOR);
            let candidate = format!("{trimmed}{SEPARATOR}");
            if !candidate.starts_with(&prefix) {
                return Err(RouteError::MissingPrefix {
                    path: path.to_string(),
                    route: self.store.route().to_string(),
                });
            }
            // `trimmed` may be exactly the prefix minus its separator
            trimmed
                .get(prefix.len()..)
                .unwrap_or_default()
                .trim_matches(SEPARATOR)
        };

        if name.is_empty() {
            return Err(RouteError::EmptyChannel {
                path: path.to_string(),
                route: self.store.route().to_string(),
            });
        }

        Ok(name)
    }
}

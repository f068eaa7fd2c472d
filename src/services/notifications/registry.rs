//! Provider lookup by kind tag.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::{
    DingTalkProvider, NotificationProvider, TelegramProvider, WeComMpnewsProvider,
    WeComRobotProvider,
};
use crate::external::HttpTransport;
use crate::models::ProviderKind;

/// Maps each [`ProviderKind`] to the adapter serving it.
///
/// Built once at startup; lookups are read-only afterwards.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn NotificationProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in provider sharing one transport
    pub fn with_builtin(transport: Arc<dyn HttpTransport>, timeout: Duration) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DingTalkProvider::new(transport.clone(), timeout)));
        registry.register(Arc::new(TelegramProvider::new(transport.clone(), timeout)));
        registry.register(Arc::new(WeComMpnewsProvider::new(transport.clone(), timeout)));
        registry.register(Arc::new(WeComRobotProvider::new(transport, timeout)));
        registry
    }

    /// Register a provider under its own kind, replacing any previous one
    pub fn register(&mut self, provider: Arc<dyn NotificationProvider>) {
        self.providers.insert(provider.kind(), provider);
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn NotificationProvider>> {
        self.providers.get(&kind).cloned()
    }

    pub fn supports(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }
}

//! Service layer for the push path.
//!
//! Services encapsulate routing, dispatch and reporting and are shared with
//! the HTTP handlers through `AppState`.

pub mod channel_store;
pub mod error;
pub mod error_log;
pub mod notifications;
pub mod push_service;
pub mod reporter;
pub mod router;

pub use channel_store::ConfigStore;
pub use error::{PushError, RouteError};
pub use error_log::{ErrorLog, ErrorRecord};
pub use push_service::PushService;
pub use reporter::{PushReply, Report, ResponseReporter};
pub use router::ChannelRouter;

use std::sync::Arc;

use crate::services::notifications::ProviderRegistry;

/// Aggregates all services for convenient access.
///
/// This struct is designed to be used as Axum application state.
/// Cloning is cheap since everything shared sits behind an `Arc`.
#[derive(Clone)]
pub struct Services {
    pub store: Arc<ConfigStore>,
    pub push: PushService,
}

impl Services {
    pub fn new(store: Arc<ConfigStore>, registry: ProviderRegistry, error_log: Arc<ErrorLog>) -> Self {
        Self {
            push: PushService::new(store.clone(), registry, error_log),
            store,
        }
    }
}

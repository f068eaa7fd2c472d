//! Picks the provider for a channel and performs exactly one send.

use crate::models::{ChannelConfig, PushRequest};
use crate::services::error::{PushError, RouteError};

use super::ProviderRegistry;

/// Result of one dispatch, consumed once by the reporter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Success { raw_response: String },
    Failure { reason: PushError },
}

impl From<PushError> for DispatchOutcome {
    fn from(reason: PushError) -> Self {
        DispatchOutcome::Failure { reason }
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    registry: ProviderRegistry,
}

impl Dispatcher {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    /// Send `request` through the provider registered for the channel's kind.
    ///
    /// An empty message fails before any provider is looked up.
    pub async fn dispatch(&self, channel: &ChannelConfig, request: &PushRequest) -> DispatchOutcome {
        if request.message.is_empty() {
            return PushError::from(RouteError::MissingMessage {
                channel: channel.name().to_string(),
                kind: channel.kind(),
            })
            .into();
        }

        let Some(provider) = self.registry.get(channel.kind()) else {
            return PushError::UnsupportedKind(channel.kind()).into();
        };

        tracing::debug!(channel = %channel.name(), kind = %channel.kind(), "Dispatching push");

        match provider.send(channel.config(), request).await {
            Ok(raw_response) => DispatchOutcome::Success { raw_response },
            Err(e) => PushError::from(e).into(),
        }
    }
}

//! Core notification provider trait and types.
//!
//! One implementation exists per [`ProviderKind`]. Providers hold only their
//! transport and timeout; the per-channel settings arrive with every call so a
//! single instance serves all channels of its kind.

use async_trait::async_trait;
use thiserror::Error;

use crate::external::TransportError;
use crate::models::{ProviderConfig, ProviderKind, PushRequest};

/// Adapter-level failure of a single send
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("missing required config key '{key}' for {kind}")]
    MissingConfig {
        kind: ProviderKind,
        key: &'static str,
    },

    #[error("invalid config value for '{key}': {reason}")]
    InvalidConfig { key: &'static str, reason: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The provider answered without its success marker
    #[error("{response}")]
    Rejected { response: String },
}

/// Trait for push providers (DingTalk, Telegram, WeCom, ...)
///
/// Uses `async_trait` to support async methods with dynamic dispatch.
#[async_trait]
pub trait NotificationProvider: Send + Sync {
    /// Kind tag this provider is registered under
    fn kind(&self) -> ProviderKind;

    /// Send one message.
    ///
    /// Returns the raw provider response when it carries the provider's success
    /// marker. Required config keys are checked before any network call.
    async fn send(
        &self,
        config: &ProviderConfig,
        request: &PushRequest,
    ) -> Result<String, ProviderError>;
}

/// Fetch a required key or fail with [`ProviderError::MissingConfig`]
pub(crate) fn require<'a>(
    config: &'a ProviderConfig,
    kind: ProviderKind,
    key: &'static str,
) -> Result<&'a str, ProviderError> {
    config
        .get(key)
        .ok_or(ProviderError::MissingConfig { kind, key })
}

/// Accept `response` only when it contains `marker`
pub(crate) fn classify(response: String, marker: &str) -> Result<String, ProviderError> {
    if response.contains(marker) {
        Ok(response)
    } else {
        Err(ProviderError::Rejected { response })
    }
}

/// Message text with the title, if any, on the lines before it
pub(crate) fn compose_text(request: &PushRequest, separator: &str) -> String {
    match &request.title {
        Some(title) => format!("{title}{separator}{}", request.message),
        None => request.message.clone(),
    }
}

/// Parse a "true"/"false" style flag, tolerating case and 1/0
pub(crate) fn parse_flag(
    config: &ProviderConfig,
    key: &'static str,
) -> Result<Option<bool>, ProviderError> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            _ => Err(ProviderError::InvalidConfig {
                key,
                reason: format!("expected a boolean, got '{value}'"),
            }),
        },
    }
}

/// Split a comma separated list, dropping blanks
pub(crate) fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

//! Per-request failures of the push path.
//!
//! None of these ever reach the caller verbatim: the reporter logs the
//! `Display` text as the diagnostic and answers with the generic 404 envelope.

use thiserror::Error;

use crate::models::ProviderKind;
use crate::services::notifications::ProviderError;

/// Failure to turn an inbound request into a (channel, message) pair
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("request path is outside the route prefix - request path: {path}, route prefix: {route}")]
    MissingPrefix { path: String, route: String },

    #[error("missing channel name - request path: {path}, route prefix: {route}")]
    EmptyChannel { path: String, route: String },

    #[error("channel not found - requested: {name}, available: [{}]", .known.join(", "))]
    UnknownChannel { name: String, known: Vec<String> },

    #[error("missing msg parameter - channel: {channel}, kind: {kind}")]
    MissingMessage { channel: String, kind: ProviderKind },
}

impl RouteError {
    /// Channel name to record for this failure; empty when no name was found
    pub fn channel(&self) -> &str {
        match self {
            RouteError::MissingPrefix { .. } | RouteError::EmptyChannel { .. } => "",
            RouteError::UnknownChannel { name, .. } => name,
            RouteError::MissingMessage { channel, .. } => channel,
        }
    }
}

/// Any failure of a single push request
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PushError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("unsupported provider kind: {0}")]
    UnsupportedKind(ProviderKind),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

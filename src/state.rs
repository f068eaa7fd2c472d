//! Application state for Axum web framework.

use crate::services::Services;

/// Shared state handed to every handler.
///
/// Cloning is cheap since Services holds only `Arc`s and small handles.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
}

impl AppState {
    pub fn new(services: Services) -> Self {
        Self { services }
    }
}

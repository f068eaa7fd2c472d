//! Telegram bot provider using `sendMessage`.
//!
//! API reference: https://core.telegram.org/bots/api#sendmessage

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value as JsonValue, json};

use super::provider::{NotificationProvider, ProviderError, classify, compose_text, parse_flag, require};
use crate::external::{HttpTransport, OutboundRequest};
use crate::models::{ProviderConfig, ProviderKind, PushRequest};

const DEFAULT_API_BASE: &str = "https://api.telegram.org";
const SUCCESS_MARKER: &str = r#""ok":true"#;

/// Telegram notification provider
///
/// Config keys: `bot_token`, `chat_id` (required); `api_base`, `parse_mode`,
/// `disable_notification` (optional).
#[derive(Clone)]
pub struct TelegramProvider {
    transport: Arc<dyn HttpTransport>,
    timeout: Duration,
}

impl TelegramProvider {
    pub fn new(transport: Arc<dyn HttpTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    fn build_api_url(config: &ProviderConfig) -> Result<String, ProviderError> {
        let bot_token = require(config, ProviderKind::TelegramText, "bot_token")?;
        let api_base = config.get("api_base").unwrap_or(DEFAULT_API_BASE);
        Ok(format!(
            "{}/bot{}/sendMessage",
            api_base.trim_end_matches('/'),
            bot_token
        ))
    }

    fn build_request_body(
        config: &ProviderConfig,
        request: &PushRequest,
    ) -> Result<JsonValue, ProviderError> {
        let chat_id = require(config, ProviderKind::TelegramText, "chat_id")?;

        let mut body = json!({
            "chat_id": chat_id,
            "text": compose_text(request, "\n\n"),
        });

        if let Some(parse_mode) = config.get("parse_mode") {
            body["parse_mode"] = json!(parse_mode);
        }

        if let Some(silent) = parse_flag(config, "disable_notification")? {
            body["disable_notification"] = json!(silent);
        }

        Ok(body)
    }
}

#[async_trait]
impl NotificationProvider for TelegramProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::TelegramText
    }

    async fn send(
        &self,
        config: &ProviderConfig,
        request: &PushRequest,
    ) -> Result<String, ProviderError> {
        let url = Self::build_api_url(config)?;
        let body = Self::build_request_body(config, request)?;

        let response = self
            .transport
            .request(OutboundRequest::post_json(url, body, self.timeout))
            .await?;

        classify(response, SUCCESS_MARKER)
    }
}

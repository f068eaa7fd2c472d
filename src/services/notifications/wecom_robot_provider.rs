//! WeCom group robot provider, plain text messages.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value as JsonValue, json};

use super::provider::{NotificationProvider, ProviderError, classify, compose_text, split_list};
use crate::external::{HttpTransport, OutboundRequest};
use crate::models::{ProviderConfig, ProviderKind, PushRequest};

const DEFAULT_BASE_URL: &str = "https://qyapi.weixin.qq.com/cgi-bin/webhook/send";
const SUCCESS_MARKER: &str = r#""errcode":0"#;

/// WeCom robot provider
///
/// Either a full `webhook` URL or the robot `key` must be configured; the
/// webhook wins when both are present.
#[derive(Clone)]
pub struct WeComRobotProvider {
    transport: Arc<dyn HttpTransport>,
    timeout: Duration,
}

impl WeComRobotProvider {
    pub fn new(transport: Arc<dyn HttpTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    fn build_webhook_url(config: &ProviderConfig) -> Result<String, ProviderError> {
        if let Some(webhook) = config.get("webhook") {
            return Ok(webhook.to_string());
        }

        let key = config.get("key").ok_or(ProviderError::MissingConfig {
            kind: ProviderKind::WecomRobotText,
            key: "webhook",
        })?;
        let base_url = config.get("base_url").unwrap_or(DEFAULT_BASE_URL);

        Ok(format!("{}?key={}", base_url, urlencoding::encode(key)))
    }

    fn build_request_body(config: &ProviderConfig, request: &PushRequest) -> JsonValue {
        let mut text = json!({ "content": compose_text(request, "\n") });

        let mobiles = split_list(config.get("mentioned_mobiles"));
        if !mobiles.is_empty() {
            text["mentioned_mobile_list"] = json!(mobiles);
        }

        json!({
            "msgtype": "text",
            "text": text,
        })
    }
}

#[async_trait]
impl NotificationProvider for WeComRobotProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::WecomRobotText
    }

    async fn send(
        &self,
        config: &ProviderConfig,
        request: &PushRequest,
    ) -> Result<String, ProviderError> {
        let url = Self::build_webhook_url(config)?;
        let body = Self::build_request_body(config, request);

        let response = self
            .transport
            .request(OutboundRequest::post_json(url, body, self.timeout))
            .await?;

        classify(response, SUCCESS_MARKER)
    }
}

//! DingTalk custom robot provider, plain text messages.
//!
//! API reference: https://open.dingtalk.com/document/robots/custom-robot-access
//!
//! When a `secret` is configured the webhook URL is signed with
//! `timestamp` and `sign = urlencode(base64(hmac_sha256(secret, "{ts}\n{secret}")))`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use jiff::Timestamp;
use serde_json::{Value as JsonValue, json};
use sha2::Sha256;

use super::provider::{
    NotificationProvider, ProviderError, classify, compose_text, parse_flag, require, split_list,
};
use crate::external::{HttpTransport, OutboundRequest};
use crate::models::{ProviderConfig, ProviderKind, PushRequest};

type HmacSha256 = Hmac<Sha256>;

const DEFAULT_BASE_URL: &str = "https://oapi.dingtalk.com/robot/send";
const SUCCESS_MARKER: &str = r#""errcode":0"#;

#[derive(Clone)]
pub struct DingTalkProvider {
    transport: Arc<dyn HttpTransport>,
    timeout: Duration,
}

impl DingTalkProvider {
    pub fn new(transport: Arc<dyn HttpTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    fn build_url(config: &ProviderConfig, now_millis: i64) -> Result<String, ProviderError> {
        let access_token = require(config, ProviderKind::DingtalkText, "access_token")?;
        let base_url = config.get("base_url").unwrap_or(DEFAULT_BASE_URL);

        let mut url = format!(
            "{}?access_token={}",
            base_url,
            urlencoding::encode(access_token)
        );

        if let Some(secret) = config.get("secret") {
            let sign = sign(secret, now_millis)?;
            url.push_str(&format!("&timestamp={now_millis}&sign={sign}"));
        }

        Ok(url)
    }

    fn build_request_body(
        config: &ProviderConfig,
        request: &PushRequest,
    ) -> Result<JsonValue, ProviderError> {
        let mut body = json!({
            "msgtype": "text",
            "text": { "content": compose_text(request, "\n") },
        });

        let at_mobiles = split_list(config.get("at_mobiles"));
        let at_all = parse_flag(config, "at_all")?.unwrap_or(false);
        if !at_mobiles.is_empty() || at_all {
            body["at"] = json!({
                "atMobiles": at_mobiles,
                "isAtAll": at_all,
            });
        }

        Ok(body)
    }
}

/// URL-safe robot signature for `timestamp` (milliseconds)
fn sign(secret: &str, timestamp: i64) -> Result<String, ProviderError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| ProviderError::InvalidConfig {
            key: "secret",
            reason: e.to_string(),
        })?;
    mac.update(format!("{timestamp}\n{secret}").as_bytes());
    let digest = STANDARD.encode(mac.finalize().into_bytes());
    Ok(urlencoding::encode(&digest).into_owned())
}

#[async_trait]
impl NotificationProvider for DingTalkProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::DingtalkText
    }

    async fn send(
        &self,
        config: &ProviderConfig,
        request: &PushRequest,
    ) -> Result<String, ProviderError> {
        let url = Self::build_url(config, Timestamp::now().as_millisecond())?;
        let body = Self::build_request_body(config, request)?;

        let response = self
            .transport
            .request(OutboundRequest::post_json(url, body, self.timeout))
            .await?;

        classify(response, SUCCESS_MARKER)
    }
}

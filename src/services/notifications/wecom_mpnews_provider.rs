//! WeCom (WeChat Work) application message provider in `mpnews` format.
//!
//! Every send performs the access-key exchange first: `GET /cgi-bin/gettoken`
//! with the corp credentials, then `POST /cgi-bin/message/send` with the
//! returned token. Tokens are not cached between requests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

use super::provider::{NotificationProvider, ProviderError, classify, require};
use crate::external::{HttpTransport, OutboundRequest};
use crate::models::{ProviderConfig, ProviderKind, PushRequest};

const DEFAULT_API_BASE: &str = "https://qyapi.weixin.qq.com";
const DEFAULT_TO_USER: &str = "@all";
const SUCCESS_MARKER: &str = r#""errcode":0"#;
const TITLE_FALLBACK_CHARS: usize = 64;

const KIND: ProviderKind = ProviderKind::WecomMpnews;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    errcode: i64,
    access_token: Option<String>,
}

/// WeCom mpnews provider
///
/// Config keys: `corp_id`, `corp_secret`, `agent_id`, `thumb_media_id`
/// (required); `to_user`, `author`, `api_base` (optional).
#[derive(Clone)]
pub struct WeComMpnewsProvider {
    transport: Arc<dyn HttpTransport>,
    timeout: Duration,
}

impl WeComMpnewsProvider {
    pub fn new(transport: Arc<dyn HttpTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    fn api_base(config: &ProviderConfig) -> &str {
        config
            .get("api_base")
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
    }

    async fn fetch_access_token(&self, config: &ProviderConfig) -> Result<String, ProviderError> {
        let corp_id = require(config, KIND, "corp_id")?;
        let corp_secret = require(config, KIND, "corp_secret")?;

        let url = format!(
            "{}/cgi-bin/gettoken?corpid={}&corpsecret={}",
            Self::api_base(config),
            urlencoding::encode(corp_id),
            urlencoding::encode(corp_secret)
        );

        let response = self
            .transport
            .request(OutboundRequest::get(url, self.timeout))
            .await?;

        match serde_json::from_str::<TokenResponse>(&response) {
            Ok(TokenResponse {
                errcode: 0,
                access_token: Some(token),
            }) if !token.is_empty() => Ok(token),
            _ => Err(ProviderError::Rejected { response }),
        }
    }

    fn build_request_body(
        config: &ProviderConfig,
        request: &PushRequest,
    ) -> Result<JsonValue, ProviderError> {
        let agent_id = require(config, KIND, "agent_id")?;
        let agent_id: i64 = agent_id.parse().map_err(|_| ProviderError::InvalidConfig {
            key: "agent_id",
            reason: format!("expected a numeric agent id, got '{agent_id}'"),
        })?;
        let thumb_media_id = require(config, KIND, "thumb_media_id")?;

        let title = request
            .title
            .clone()
            .unwrap_or_else(|| truncate_chars(&request.message, TITLE_FALLBACK_CHARS));

        let mut article = json!({
            "title": title,
            "thumb_media_id": thumb_media_id,
            "content": request.message.replace('\n', "<br/>"),
            "digest": truncate_chars(&request.message, TITLE_FALLBACK_CHARS),
        });
        if let Some(author) = config.get("author") {
            article["author"] = json!(author);
        }

        Ok(json!({
            "touser": config.get("to_user").unwrap_or(DEFAULT_TO_USER),
            "msgtype": "mpnews",
            "agentid": agent_id,
            "mpnews": { "articles": [article] },
        }))
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[async_trait]
impl NotificationProvider for WeComMpnewsProvider {
    fn kind(&self) -> ProviderKind {
        KIND
    }

    async fn send(
        &self,
        config: &ProviderConfig,
        request: &PushRequest,
    ) -> Result<String, ProviderError> {
        // Validate the message shape before spending a token request
        let body = Self::build_request_body(config, request)?;
        let access_token = self.fetch_access_token(config).await?;

        let url = format!(
            "{}/cgi-bin/message/send?access_token={}",
            Self::api_base(config),
            urlencoding::encode(&access_token)
        );

        let response = self
            .transport
            .request(OutboundRequest::post_json(url, body, self.timeout))
            .await?;

        classify(response, SUCCESS_MARKER)
    }
}

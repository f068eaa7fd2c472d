//! Outbound HTTP transport shared by provider adapters and the heartbeat.
//!
//! Adapters never touch `reqwest` directly; they describe a request as an
//! [`OutboundRequest`] and hand it to an [`HttpTransport`]. The production
//! implementation wraps one pooled `reqwest::Client`; tests substitute a
//! recording fake.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Content type sent with every JSON body
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";

/// Transport-level failure: connection, timeout or unreadable body.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("failed to encode request body: {0}")]
    Encode(String),
}

/// A single outbound call
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<JsonValue>,
    pub timeout: Duration,
}

impl OutboundRequest {
    pub fn get(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            body: None,
            timeout,
        }
    }

    pub fn post_json(url: impl Into<String>, body: JsonValue, timeout: Duration) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            body: Some(body),
            timeout,
        }
    }
}

/// Generic "send bytes, get text back" collaborator.
///
/// The response body is returned whatever the HTTP status: messaging providers
/// report application errors inside a 200 body, and callers classify it.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn request(&self, request: OutboundRequest) -> Result<String, TransportError>;
}

/// `reqwest`-backed transport with connection pooling
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build the pooled client.
    ///
    /// Per-request timeouts come from each [`OutboundRequest`]; the connect
    /// timeout here only bounds the TCP/TLS handshake.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .gzip(true)
            .user_agent(concat!("infopush/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Request {
                url: String::new(),
                message: e.to_string(),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn request(&self, request: OutboundRequest) -> Result<String, TransportError> {
        let OutboundRequest {
            method,
            url,
            body,
            timeout,
        } = request;

        let mut builder = self.client.request(method, &url).timeout(timeout);

        if let Some(body) = body {
            let bytes =
                serde_json::to_vec(&body).map_err(|e| TransportError::Encode(e.to_string()))?;
            builder = builder.header(CONTENT_TYPE, JSON_CONTENT_TYPE).body(bytes);
        }

        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                TransportError::Timeout {
                    url: url.clone(),
                    timeout_secs: timeout.as_secs(),
                }
            } else {
                TransportError::Request {
                    url: url.clone(),
                    message: e.to_string(),
                }
            }
        };

        let response = builder.send().await.map_err(map_err)?;
        tracing::debug!(url = %url, status = %response.status().as_u16(), "Provider responded");

        response.text().await.map_err(map_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_returns_body_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new().unwrap();
        let body = transport
            .request(OutboundRequest::get(
                format!("{}/ping", server.uri()),
                Duration::from_secs(5),
            ))
            .await
            .unwrap();

        assert_eq!(body, "pong");
    }

    #[tokio::test]
    async fn test_post_sends_json_with_charset() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send"))
            .and(header("content-type", JSON_CONTENT_TYPE))
            .and(body_json(json!({"text": "你好"})))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"errcode":0}"#))
            .expect(1)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new().unwrap();
        let body = transport
            .request(OutboundRequest::post_json(
                format!("{}/send", server.uri()),
                json!({"text": "你好"}),
                Duration::from_secs(5),
            ))
            .await
            .unwrap();

        assert_eq!(body, r#"{"errcode":0}"#);
    }

    #[tokio::test]
    async fn test_error_status_still_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream broke"))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new().unwrap();
        let body = transport
            .request(OutboundRequest::get(server.uri(), Duration::from_secs(5)))
            .await
            .unwrap();

        assert_eq!(body, "upstream broke");
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new().unwrap();
        let err = transport
            .request(OutboundRequest::get(server.uri(), Duration::from_millis(200)))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Timeout { .. }));
    }
}

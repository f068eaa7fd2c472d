//! Router configuration for the API.

use axum::{Router, middleware};
use tower_http::catch_panic::CatchPanicLayer;

use crate::api::handlers::{handle_panic, push_handler};
use crate::api::middleware::{logging_middleware, request_id_middleware};
use crate::state::AppState;

/// Creates the application router.
///
/// There are no fixed routes: every method and path goes to the push handler,
/// which resolves the channel from the path itself.
///
/// # Middleware Order
/// Last added runs first:
/// 1. Panic catcher, turning a handler panic into the generic 404 envelope
/// 2. Request ID
/// 3. Logging, which sees the request ID
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .fallback(push_handler)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header::CONTENT_TYPE};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::api::middleware::REQUEST_ID_HEADER;
    use crate::external::testing::RecordingTransport;
    use crate::models::{ChannelConfig, ProviderConfig, ProviderKind};
    use crate::services::notifications::ProviderRegistry;
    use crate::services::{ConfigStore, ErrorLog, Services};

    struct TestApp {
        router: Router,
        transport: Arc<RecordingTransport>,
        error_log: Arc<ErrorLog>,
        _dir: TempDir,
    }

    fn app(route: &str, provider_reply: &str) -> TestApp {
        let dir = TempDir::new().unwrap();
        let transport = Arc::new(RecordingTransport::replying(provider_reply));
        let error_log = Arc::new(ErrorLog::new(dir.path().join("data").join("error.log")));

        let store = ConfigStore::new(
            route,
            vec![ChannelConfig::new(
                "alerts",
                ProviderKind::WecomRobotText,
                [("key", "robot-key")].into_iter().collect::<ProviderConfig>(),
            )],
        )
        .unwrap();
        let registry = ProviderRegistry::with_builtin(transport.clone(), Duration::from_secs(30));
        let services = Services::new(Arc::new(store), registry, error_log.clone());

        TestApp {
            router: create_router(AppState::new(services)),
            transport,
            error_log,
            _dir: dir,
        }
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn error_log_lines(app: &TestApp) -> Vec<String> {
        std::fs::read_to_string(app.error_log.path())
            .map(|c| c.lines().map(String::from).collect())
            .unwrap_or_default()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_push_success() {
        let app = app("/push", r#"{"errcode":0,"errmsg":"ok"}"#);

        let response = app
            .router
            .clone()
            .oneshot(get("/push/alerts?msg=hello"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json; charset=utf-8"
        );
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        assert_eq!(body_string(response).await, r#"{"code":"200","msg":"Success"}"#);

        let requests = app.transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url,
            "https://qyapi.weixin.qq.com/cgi-bin/webhook/send?key=robot-key"
        );
        assert_eq!(requests[0].body.as_ref().unwrap()["text"]["content"], "hello");
        assert!(error_log_lines(&app).is_empty());
    }

    #[tokio::test]
    async fn test_push_missing_msg() {
        let app = app("/push", r#"{"errcode":0,"errmsg":"ok"}"#);

        let response = app.router.clone().oneshot(get("/push/alerts")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, r#"{"code":"404","msg":"资源不存在"}"#);
        assert_eq!(app.transport.call_count(), 0);

        let lines = error_log_lines(&app);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("] alerts - missing msg parameter"));
        assert!(lines[0].ends_with("| 请求参数: msg= title="));
    }

    #[tokio::test]
    async fn test_push_unknown_channel() {
        let app = app("/push", r#"{"errcode":0,"errmsg":"ok"}"#);

        let response = app
            .router
            .clone()
            .oneshot(get("/push/missing?msg=hi"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, r#"{"code":"404","msg":"资源不存在"}"#);
        assert_eq!(app.transport.call_count(), 0);

        let lines = error_log_lines(&app);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("] missing - channel not found - requested: missing, available: [alerts]"));
        assert!(lines[0].ends_with("msg=hi title="));
    }

    #[tokio::test]
    async fn test_push_provider_rejection() {
        let app = app("/push", r#"{"errcode":93000,"errmsg":"invalid webhook url"}"#);

        let response = app
            .router
            .clone()
            .oneshot(get("/push/alerts?msg=hello&title=Deploy"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let lines = error_log_lines(&app);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains(r#"alerts - {"errcode":93000,"errmsg":"invalid webhook url"}"#));
        assert!(lines[0].ends_with("msg=hello title=Deploy"));
    }

    #[tokio::test]
    async fn test_form_body_wins_over_query() {
        let app = app("/", r#"{"errcode":0}"#);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/alerts/?msg=from-query")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("msg=from+body&title=T"))
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let requests = app.transport.requests();
        assert_eq!(requests[0].body.as_ref().unwrap()["text"]["content"], "T\nfrom body");
    }

    #[tokio::test]
    async fn test_multipart_body_is_read() {
        let app = app("/push", r#"{"errcode":0}"#);

        let body = "--XB\r\n\
                    Content-Disposition: form-data; name=\"msg\"\r\n\r\n\
                    hello\r\n\
                    --XB\r\n\
                    Content-Disposition: form-data; name=\"title\"\r\n\r\n\
                    Deploy\r\n\
                    --XB--\r\n";
        let request = Request::builder()
            .method(Method::POST)
            .uri("/push/alerts?msg=from-query")
            .header(CONTENT_TYPE, "multipart/form-data; boundary=XB")
            .body(Body::from(body))
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(app.transport.call_count(), 1);
        assert_eq!(
            app.transport.requests()[0].body.as_ref().unwrap()["text"]["content"],
            "Deploy\nhello"
        );
        assert!(error_log_lines(&app).is_empty());
    }

    #[tokio::test]
    async fn test_multipart_without_msg_falls_back_to_query() {
        let app = app("/push", r#"{"errcode":0}"#);

        let body = "--XB\r\n\
                    Content-Disposition: form-data; name=\"title\"\r\n\r\n\
                    Deploy\r\n\
                    --XB--\r\n";
        let request = Request::builder()
            .method(Method::POST)
            .uri("/push/alerts?msg=from-query")
            .header(CONTENT_TYPE, "multipart/form-data; boundary=XB")
            .body(Body::from(body))
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            app.transport.requests()[0].body.as_ref().unwrap()["text"]["content"],
            "Deploy\nfrom-query"
        );
    }

    #[tokio::test]
    async fn test_prefix_superstring_is_not_found() {
        let app = app("/push", r#"{"errcode":0}"#);

        let response = app
            .router
            .clone()
            .oneshot(get("/pushalerts?msg=hi"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(app.transport.call_count(), 0);
        let lines = error_log_lines(&app);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("]  - request path is outside the route prefix"));
    }

    #[tokio::test]
    async fn test_percent_encoded_path_and_any_method() {
        let app = app("/push", r#"{"errcode":0}"#);

        let request = Request::builder()
            .method(Method::PUT)
            .uri("/push/%61lerts?msg=%E4%BD%A0%E5%A5%BD")
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            app.transport.requests()[0].body.as_ref().unwrap()["text"]["content"],
            "你好"
        );
    }
}

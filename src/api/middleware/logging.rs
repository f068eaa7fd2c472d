//! Request/response logging with timing, correlated by request id.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{Instrument, debug, info_span, warn};

use super::RequestId;

/// Logs method and path on arrival, status and duration on completion.
///
/// Non-2xx replies are logged at `warn`, since every failed push ends as 404.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let span = info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id
    );

    async move {
        debug!("Request received");

        let start = Instant::now();
        let response = next.run(request).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        let status = response.status();

        if status.is_success() {
            debug!(status = status.as_u16(), duration_ms, "Response sent");
        } else {
            warn!(status = status.as_u16(), duration_ms, "Response sent");
        }

        response
    }
    .instrument(span)
    .await
}

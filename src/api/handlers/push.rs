//! Catch-all push handler.
//!
//! Every method and every path lands here; the channel is whatever follows
//! the configured route prefix.

use std::any::Any;

use axum::{
    Form,
    extract::{FromRequest, Multipart, Query, Request, State, rejection::QueryRejection},
    http::{HeaderValue, StatusCode, Uri, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};

use crate::api::dto::{PushParams, PushResponse};
use crate::services::PushReply;
use crate::state::AppState;

/// Content type of every reply
pub const REPLY_CONTENT_TYPE: &str = "application/json; charset=utf-8";

impl IntoResponse for PushReply {
    fn into_response(self) -> Response {
        let status = match self {
            PushReply::Success => StatusCode::OK,
            PushReply::NotFound => StatusCode::NOT_FOUND,
        };

        let body = match serde_json::to_string(&PushResponse::from(self)) {
            Ok(body) => body,
            Err(_) => format!(r#"{{"code":"{}","msg":"{}"}}"#, self.code(), self.msg()),
        };

        (
            status,
            [(CONTENT_TYPE, HeaderValue::from_static(REPLY_CONTENT_TYPE))],
            body,
        )
            .into_response()
    }
}

/// Push one message to the channel named by the request path.
///
/// `msg` and `title` are read from the body first (urlencoded or multipart),
/// then the query string. Unparseable parameter sources count as empty.
pub async fn push_handler(
    State(state): State<AppState>,
    uri: Uri,
    query: Result<Query<PushParams>, QueryRejection>,
    request: Request,
) -> PushReply {
    let query = query.map(|Query(p)| p).unwrap_or_default();
    let body = body_params(request).await;
    let params = body.or(query);

    let path = urlencoding::decode(uri.path())
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| uri.path().to_string());

    state.services.push.push(&path, params.into()).await
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
}

async fn body_params(request: Request) -> PushParams {
    if is_multipart(&request) {
        match Multipart::from_request(request, &()).await {
            Ok(multipart) => multipart_params(multipart).await,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unreadable multipart body");
                PushParams::default()
            }
        }
    } else {
        Form::<PushParams>::from_request(request, &())
            .await
            .map(|Form(p)| p)
            .unwrap_or_default()
    }
}

/// First `msg` and `title` fields win; other parts are skipped.
async fn multipart_params(mut multipart: Multipart) -> PushParams {
    let mut params = PushParams::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(error = %e, "Stopped reading multipart body");
                break;
            }
        };

        let slot = match field.name() {
            Some("msg") if params.msg.is_none() => &mut params.msg,
            Some("title") if params.title.is_none() => &mut params.title,
            _ => continue,
        };
        *slot = field.text().await.ok();
    }

    params
}

/// Panic hook for `CatchPanicLayer`: same generic envelope as any failure
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!(panic = %detail, "Handler panicked");

    PushReply::NotFound.into_response()
}

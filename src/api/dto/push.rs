//! Push endpoint DTOs.

use serde::{Deserialize, Serialize};

use crate::models::PushRequest;
use crate::services::PushReply;

/// Inbound `msg` / `title`, from either the query string or a form body
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PushParams {
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl PushParams {
    /// Combine two sources; values present in `self` win over `fallback`
    pub fn or(self, fallback: PushParams) -> PushParams {
        PushParams {
            msg: self.msg.or(fallback.msg),
            title: self.title.or(fallback.title),
        }
    }
}

impl From<PushParams> for PushRequest {
    fn from(params: PushParams) -> Self {
        PushRequest::new(params.msg.unwrap_or_default(), params.title)
    }
}

/// Response envelope: `{"code":"200","msg":"Success"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushResponse {
    pub code: String,
    pub msg: String,
}

impl From<PushReply> for PushResponse {
    fn from(reply: PushReply) -> Self {
        Self {
            code: reply.code().to_string(),
            msg: reply.msg().to_string(),
        }
    }
}

//! Turns a dispatch outcome into the caller reply, a console line and, on
//! failure, one error-log record.

use std::sync::Arc;

use serde_json::json;

use crate::logger::PUSH_RESULT_TARGET;
use crate::models::PushRequest;
use crate::services::error_log::{ErrorLog, ErrorRecord};
use crate::services::notifications::DispatchOutcome;
use crate::utils::timestamp;

/// Caller-visible result. Carries no provider detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushReply {
    Success,
    NotFound,
}

impl PushReply {
    pub fn code(&self) -> &'static str {
        match self {
            PushReply::Success => "200",
            PushReply::NotFound => "404",
        }
    }

    pub fn msg(&self) -> &'static str {
        match self {
            PushReply::Success => "Success",
            PushReply::NotFound => "资源不存在",
        }
    }
}

/// Everything a single request produces, before any of it is emitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub reply: PushReply,
    pub console_line: String,
    pub error_record: Option<ErrorRecord>,
}

#[derive(Debug, Clone)]
pub struct ResponseReporter {
    error_log: Arc<ErrorLog>,
}

impl ResponseReporter {
    pub fn new(error_log: Arc<ErrorLog>) -> Self {
        Self { error_log }
    }

    /// Build the report for `outcome` at time `ts` without side effects
    pub fn build(ts: &str, channel: &str, outcome: &DispatchOutcome, params: &PushRequest) -> Report {
        match outcome {
            DispatchOutcome::Success { raw_response } => Report {
                reply: PushReply::Success,
                console_line: console_line(ts, channel, PushReply::Success, raw_response),
                error_record: None,
            },
            DispatchOutcome::Failure { reason } => {
                let diagnostic = reason.to_string();
                Report {
                    reply: PushReply::NotFound,
                    console_line: console_line(ts, channel, PushReply::NotFound, &diagnostic),
                    error_record: Some(ErrorRecord {
                        timestamp: ts.to_string(),
                        channel: channel.to_string(),
                        diagnostic,
                        msg: params.message.clone(),
                        title: params.title.clone().unwrap_or_default(),
                    }),
                }
            }
        }
    }

    /// Emit the console line, append the error record if any, return the reply.
    ///
    /// A failed append is logged; the caller still gets its reply.
    pub async fn report(
        &self,
        channel: &str,
        outcome: &DispatchOutcome,
        params: &PushRequest,
    ) -> PushReply {
        let report = Self::build(&timestamp(), channel, outcome, params);

        match &report.error_record {
            None => {
                tracing::info!(
                    target: PUSH_RESULT_TARGET,
                    channel = %channel,
                    "{}",
                    report.console_line
                )
            }
            Some(record) => {
                tracing::warn!(
                    target: PUSH_RESULT_TARGET,
                    channel = %channel,
                    "{}",
                    report.console_line
                );
                if let Err(e) = self.error_log.append(record).await {
                    tracing::error!(
                        path = %self.error_log.path().display(),
                        error = %e,
                        "Failed to append to error log"
                    );
                }
            }
        }

        report.reply
    }
}

/// `[ts] channel - {"code":"...","msg":"..."}`
fn console_line(ts: &str, channel: &str, reply: PushReply, msg: &str) -> String {
    format!(
        "[{}] {} - {}",
        ts,
        channel,
        json!({ "code": reply.code(), "msg": msg })
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProviderKind;
    use crate::services::error::{PushError, RouteError};
    use crate::services::notifications::ProviderError;
    use tempfile::TempDir;

    const TS: &str = "2024-01-02 03:04:05.678";

    fn success(raw: &str) -> DispatchOutcome {
        DispatchOutcome::Success {
            raw_response: raw.to_string(),
        }
    }

    #[test]
    fn test_success_reply_ignores_raw_response() {
        for raw in ["", r#"{"errcode":0}"#, "anything at all"] {
            let report = ResponseReporter::build(TS, "alerts", &success(raw), &PushRequest::default());
            assert_eq!(report.reply, PushReply::Success);
            assert_eq!(report.reply.code(), "200");
            assert_eq!(report.reply.msg(), "Success");
            assert!(report.error_record.is_none());
        }
    }

    #[test]
    fn test_success_console_line_carries_raw_response() {
        let report = ResponseReporter::build(
            TS,
            "alerts",
            &success(r#"{"errcode":0}"#),
            &PushRequest::new("hi", None),
        );
        assert_eq!(
            report.console_line,
            r#"[2024-01-02 03:04:05.678] alerts - {"code":"200","msg":"{\"errcode\":0}"}"#
        );
    }

    #[test]
    fn test_failure_builds_generic_reply_and_record() {
        let outcome = DispatchOutcome::Failure {
            reason: PushError::Provider(ProviderError::Rejected {
                response: "denied".to_string(),
            }),
        };
        let report = ResponseReporter::build(
            TS,
            "ops",
            &outcome,
            &PushRequest::new("disk full", Some("Alert".to_string())),
        );

        assert_eq!(report.reply, PushReply::NotFound);
        assert_eq!(report.reply.msg(), "资源不存在");
        assert_eq!(
            report.console_line,
            r#"[2024-01-02 03:04:05.678] ops - {"code":"404","msg":"denied"}"#
        );
        assert_eq!(
            report.error_record.unwrap().to_line(),
            "[2024-01-02 03:04:05.678] ops - denied | 请求参数: msg=disk full title=Alert"
        );
    }

    #[tokio::test]
    async fn test_report_failure_appends_exactly_one_line() {
        let dir = TempDir::new().unwrap();
        let log = Arc::new(ErrorLog::new(dir.path().join("error.log")));
        let reporter = ResponseReporter::new(log.clone());

        let outcome = DispatchOutcome::Failure {
            reason: PushError::Route(RouteError::MissingMessage {
                channel: "alerts".to_string(),
                kind: ProviderKind::WecomRobotText,
            }),
        };
        let reply = reporter
            .report("alerts", &outcome, &PushRequest::default())
            .await;

        assert_eq!(reply, PushReply::NotFound);
        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains(
            "alerts - missing msg parameter - channel: alerts, kind: wecom_robot_text | 请求参数: msg= title="
        ));
    }

    #[tokio::test]
    async fn test_report_success_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let log = Arc::new(ErrorLog::new(dir.path().join("error.log")));
        let reporter = ResponseReporter::new(log.clone());

        let reply = reporter
            .report("alerts", &success("ok"), &PushRequest::new("hi", None))
            .await;

        assert_eq!(reply, PushReply::Success);
        assert!(!log.path().exists());
    }
}

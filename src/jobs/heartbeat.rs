//! Periodic liveness ping against an external URL.
//!
//! Runs independently of the push path: it shares only the outbound
//! transport, which holds no per-request state.

use std::sync::Arc;
use std::time::Duration;

use tokio_cron_scheduler::Job;

use crate::config::HeartbeatConfig;
use crate::external::{HttpTransport, OutboundRequest, TransportError};
use crate::jobs::error::{JobError, JobResult};
use crate::utils::timestamp;

#[derive(Clone)]
pub struct Heartbeat {
    url: String,
    interval: Duration,
    timeout: Duration,
    transport: Arc<dyn HttpTransport>,
}

impl Heartbeat {
    /// `None` when no heartbeat URL is configured
    pub fn from_config(config: &HeartbeatConfig, transport: Arc<dyn HttpTransport>) -> Option<Self> {
        config.is_enabled().then(|| Self {
            url: config.url.trim().to_string(),
            interval: Duration::from_secs(config.interval),
            timeout: Duration::from_secs(config.timeout),
            transport,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// One GET against the configured URL; the outcome is logged and returned
    pub async fn beat(&self) -> Result<String, TransportError> {
        let result = self
            .transport
            .request(OutboundRequest::get(self.url.clone(), self.timeout))
            .await;

        match &result {
            Ok(body) => tracing::info!(url = %self.url, "[{}] heartbeat response: {}", timestamp(), body),
            Err(e) => tracing::warn!(url = %self.url, "[{}] heartbeat failed: {}", timestamp(), e),
        }

        result
    }

    /// Repeating job firing every `interval`, first tick one interval after start
    pub fn into_job(self) -> JobResult<Job> {
        if self.interval.is_zero() {
            return Err(JobError::InvalidInterval(
                "heartbeat interval must be greater than 0".to_string(),
            ));
        }

        let heartbeat = Arc::new(self);
        let job = Job::new_repeated_async(heartbeat.interval, move |_uuid, _lock| {
            let heartbeat = Arc::clone(&heartbeat);
            Box::pin(async move {
                let _ = heartbeat.beat().await;
            })
        })?;

        Ok(job)
    }
}

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler as TokioCronScheduler};

use crate::jobs::error::JobResult;

/// Wrapper around tokio-cron-scheduler owning the background jobs
#[derive(Clone)]
pub struct JobScheduler {
    scheduler: Arc<Mutex<TokioCronScheduler>>,
}

impl JobScheduler {
    pub async fn new() -> JobResult<Self> {
        let scheduler = TokioCronScheduler::new().await?;
        Ok(Self {
            scheduler: Arc::new(Mutex::new(scheduler)),
        })
    }

    pub async fn add(&self, job: Job) -> JobResult<()> {
        let id = self.scheduler.lock().await.add(job).await?;
        tracing::debug!(job_id = %id, "Job scheduled");
        Ok(())
    }

    pub async fn start(&self) -> JobResult<()> {
        self.scheduler.lock().await.start().await?;
        Ok(())
    }

    /// Stop the scheduler gracefully
    pub async fn stop(&self) -> JobResult<()> {
        self.scheduler.lock().await.shutdown().await?;
        Ok(())
    }
}

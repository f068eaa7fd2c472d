use thiserror::Error;
use tokio_cron_scheduler::JobSchedulerError;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Invalid job interval: {0}")]
    InvalidInterval(String),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] JobSchedulerError),
}

pub type JobResult<T> = Result<T, JobError>;

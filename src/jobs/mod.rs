pub mod error;
pub mod heartbeat;
pub mod scheduler;

pub use error::{JobError, JobResult};
pub use heartbeat::Heartbeat;
pub use scheduler::JobScheduler;

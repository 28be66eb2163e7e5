use crate::job::{Job, JobHandle};
use crate::Result;
use async_trait::async_trait;

/// Asynchronous execution boundary.
///
/// Implementations must execute jobs sharing a project id in submission
/// order, never overlapping; jobs for different projects may run
/// concurrently. `delay` is fire-and-forget: failures inside the job body
/// are recorded on the History/Project, never returned here.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Enqueue a job for deferred execution.
    async fn delay(&self, job: Job) -> Result<JobHandle>;

    /// Run the job body in the calling context, blocking until it returns.
    async fn run_now(&self, job: Job) -> Result<()>;
}

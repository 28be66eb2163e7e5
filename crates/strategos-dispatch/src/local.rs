use crate::executor::JobExecutor;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use strategos_core::{Dispatcher, Error as CoreError, Job, JobHandle};
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

/// In-process dispatcher over tokio.
///
/// Every job is routed through a queue keyed by its project id, drained by
/// one task per project: jobs for the same project run strictly in
/// submission order and never overlap, so a repo sync acts as a barrier for
/// that project's working directory. Jobs for different projects run
/// concurrently.
pub struct LocalDispatcher {
    executor: Arc<JobExecutor>,
    queues: Mutex<HashMap<Uuid, mpsc::UnboundedSender<Job>>>,
}

impl LocalDispatcher {
    pub fn new(executor: Arc<JobExecutor>) -> Self {
        Self {
            executor,
            queues: Mutex::new(HashMap::new()),
        }
    }

    async fn sender_for(&self, project_id: Uuid) -> mpsc::UnboundedSender<Job> {
        let mut queues = self.queues.lock().await;

        if let Some(sender) = queues.get(&project_id) {
            if !sender.is_closed() {
                return sender.clone();
            }
        }

        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
        let executor = self.executor.clone();

        tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                // The executor has already recorded the failure on the
                // History/Project; the caller returned long ago.
                if let Err(err) = executor.execute(job).await {
                    tracing::error!("Job for project {} failed: {}", project_id, err);
                }
            }
        });

        queues.insert(project_id, sender.clone());
        sender
    }
}

#[async_trait]
impl Dispatcher for LocalDispatcher {
    async fn delay(&self, job: Job) -> strategos_core::Result<JobHandle> {
        let sender = self.sender_for(job.project_id()).await;
        sender
            .send(job)
            .map_err(|err| CoreError::Dispatch(err.to_string()))?;
        Ok(JobHandle::new())
    }

    async fn run_now(&self, job: Job) -> strategos_core::Result<()> {
        self.executor
            .execute(job)
            .await
            .map_err(|err| CoreError::Dispatch(err.to_string()))
    }
}

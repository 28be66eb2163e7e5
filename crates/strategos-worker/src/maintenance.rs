use anyhow::Result;
use chrono::{Duration, Utc};
use std::sync::Arc;
use strategos_core::{Dispatcher, ExecuteOptions, HistoryStatus, Job, Storage};

/// Periodic sweeps over the history table.
///
/// `requeue_stranded` puts DELAY records back on the queue when their job
/// never started (the enqueueing process died before its dispatcher drained
/// the job). `fail_stalled` closes out RUN records whose worker is gone, so
/// callers polling by id eventually see a terminal status.
pub struct Maintenance {
    storage: Arc<dyn Storage>,
    dispatcher: Arc<dyn Dispatcher>,
    requeue_after: Duration,
    stall_timeout: Duration,
}

impl Maintenance {
    pub fn new(
        storage: Arc<dyn Storage>,
        dispatcher: Arc<dyn Dispatcher>,
        requeue_after: Duration,
        stall_timeout: Duration,
    ) -> Self {
        Self {
            storage,
            dispatcher,
            requeue_after,
            stall_timeout,
        }
    }

    /// Re-dispatch DELAY records older than the requeue threshold.
    pub async fn requeue_stranded(&self) -> Result<usize> {
        let now = Utc::now();
        let mut requeued = 0;

        for history in self
            .storage
            .histories_by_status(HistoryStatus::Delay)
            .await?
        {
            if now.signed_duration_since(history.start_time) < self.requeue_after {
                continue;
            }

            tracing::warn!(
                "Requeueing stranded {} '{}' ({})",
                history.kind.as_str(),
                history.name,
                history.id
            );

            self.dispatcher
                .delay(Job::RunAnsible {
                    project_id: history.project_id,
                    inventory_id: history.inventory_id,
                    history_id: history.id,
                    kind: history.kind,
                    target: history.name.clone(),
                    options: ExecuteOptions::default(),
                })
                .await?;
            requeued += 1;
        }

        Ok(requeued)
    }

    /// Mark RUN records older than the stall timeout as ERROR.
    pub async fn fail_stalled(&self) -> Result<usize> {
        let now = Utc::now();
        let mut failed = 0;

        for history in self.storage.histories_by_status(HistoryStatus::Run).await? {
            if now.signed_duration_since(history.start_time) < self.stall_timeout {
                continue;
            }

            tracing::warn!(
                "Run {} ('{}') stalled, marking as failed",
                history.id,
                history.name
            );

            self.storage
                .append_history_stdout(history.id, "Run timed out\n")
                .await?;
            self.storage
                .finish_history(history.id, HistoryStatus::Error, now)
                .await?;
            failed += 1;
        }

        Ok(failed)
    }
}

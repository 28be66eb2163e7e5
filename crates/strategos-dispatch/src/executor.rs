use crate::error::{Error, Result};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use strategos_core::{
    ExecuteOptions, HistoryKind, HistoryStatus, Job, PlaybookRunner, ProjectStatus,
    RepoOperation, RunnerInvocation, Storage,
};
use strategos_repo::{BackendRegistry, SyncOptions, SyncOutput};
use uuid::Uuid;

/// Job bodies: what actually runs when the dispatcher picks a job up.
///
/// Backend and runner failures never leave this type: they end up on the
/// Project status or the History record, where the original caller polls
/// for them. Only storage failures propagate, since without storage there
/// is nowhere to record anything.
pub struct JobExecutor {
    storage: Arc<dyn Storage>,
    registry: Arc<BackendRegistry>,
    runner: Arc<dyn PlaybookRunner>,
    projects_dir: PathBuf,
}

impl JobExecutor {
    pub fn new(
        storage: Arc<dyn Storage>,
        registry: Arc<BackendRegistry>,
        runner: Arc<dyn PlaybookRunner>,
        projects_dir: PathBuf,
    ) -> Self {
        Self {
            storage,
            registry,
            runner,
            projects_dir,
        }
    }

    pub async fn execute(&self, job: Job) -> Result<()> {
        match job {
            Job::RepoSync {
                project_id,
                operation,
            } => self.execute_repo_sync(project_id, operation).await,
            Job::RunAnsible {
                project_id,
                inventory_id,
                history_id,
                kind,
                target,
                options,
            } => {
                self.execute_ansible(project_id, inventory_id, history_id, kind, target, options)
                    .await
            }
        }
    }

    /// WAIT_SYNC -> SYNC -> OK, or ERROR on any backend failure.
    async fn execute_repo_sync(&self, project_id: Uuid, operation: RepoOperation) -> Result<()> {
        let project = self
            .storage
            .get_project(project_id)
            .await?
            .ok_or(Error::MissingProject(project_id))?;

        self.storage
            .set_project_status(project_id, ProjectStatus::Sync)
            .await?;

        tracing::info!(
            "Repo {} started for project {} ({})",
            operation.as_str(),
            project.name,
            project_id
        );

        let result = match self.registry.resolve(&project, &self.projects_dir) {
            Ok(backend) => {
                let options = SyncOptions::new();
                match operation {
                    RepoOperation::Clone => backend.make_clone(&options).await,
                    RepoOperation::Sync => backend.make_update(&options).await,
                }
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(SyncOutput { stdout, stderr }) => {
                if let Some(out) = stdout {
                    tracing::debug!("Repo {} stdout: {}", operation.as_str(), out);
                }
                if let Some(err) = stderr {
                    tracing::debug!("Repo {} stderr: {}", operation.as_str(), err);
                }
                self.storage
                    .set_project_status(project_id, ProjectStatus::Ok)
                    .await?;
            }
            Err(err) => {
                tracing::error!(
                    "Repo {} failed for project {}: {}",
                    operation.as_str(),
                    project_id,
                    err
                );
                self.storage
                    .set_project_status(project_id, ProjectStatus::Error)
                    .await?;
            }
        }

        Ok(())
    }

    /// DELAY -> RUN -> OK/ERROR, with captured output appended as it lands.
    async fn execute_ansible(
        &self,
        project_id: Uuid,
        inventory_id: Uuid,
        history_id: Uuid,
        kind: HistoryKind,
        target: String,
        options: ExecuteOptions,
    ) -> Result<()> {
        let project = self
            .storage
            .get_project(project_id)
            .await?
            .ok_or(Error::MissingProject(project_id))?;
        let inventory = self
            .storage
            .get_inventory(inventory_id)
            .await?
            .ok_or(Error::MissingInventory(inventory_id))?;

        self.storage
            .set_history_status(history_id, HistoryStatus::Run)
            .await?;

        tracing::info!(
            "{} '{}' running on project {} (history {})",
            kind.as_str(),
            target,
            project.name,
            history_id
        );

        let invocation = RunnerInvocation {
            kind,
            target,
            inventory,
            project_path: project.work_dir(&self.projects_dir),
            options,
        };

        match self.runner.run(invocation).await {
            Ok(outcome) => {
                if !outcome.stdout.is_empty() {
                    self.storage
                        .append_history_stdout(history_id, &outcome.stdout)
                        .await?;
                }
                let status = if outcome.ok {
                    HistoryStatus::Ok
                } else {
                    HistoryStatus::Error
                };
                self.storage
                    .finish_history(history_id, status, Utc::now())
                    .await?;
            }
            Err(err) => {
                tracing::error!("Runner failed for history {}: {}", history_id, err);
                self.storage
                    .append_history_stdout(history_id, &format!("{}\n", err))
                    .await?;
                self.storage
                    .finish_history(history_id, HistoryStatus::Error, Utc::now())
                    .await?;
            }
        }

        Ok(())
    }
}

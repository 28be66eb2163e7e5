use crate::error::{Error, Result};
use crate::history::{History, HistoryKind};
use crate::job::{ExecuteOptions, Job, JobHandle, RepoOperation};
use crate::project::{NewProject, Project, ProjectStatus};
use crate::{Dispatcher, Storage};
use std::sync::Arc;
use uuid::Uuid;

/// Project operations: creation, status bookkeeping, and dispatch of repo
/// sync and ansible runs onto the job queue.
#[derive(Clone)]
pub struct ProjectService {
    storage: Arc<dyn Storage>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl ProjectService {
    pub fn new(storage: Arc<dyn Storage>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            storage,
            dispatcher,
        }
    }

    /// Create and persist a project, then trigger the initial clone.
    ///
    /// The returned project is already in `WaitSync` with the clone job
    /// enqueued.
    pub async fn create(&self, attributes: NewProject) -> Result<Project> {
        attributes.validate()?;

        let project = Project::new(attributes.name, attributes.repository)
            .with_variables(attributes.variables);
        let project = self.storage.create_project(project).await?;

        tracing::info!("Created project: {} ({})", project.name, project.id);

        self.start_repo_task(project.id, RepoOperation::Clone).await?;

        self.storage
            .get_project(project.id)
            .await?
            .ok_or(Error::ProjectNotFound(project.id))
    }

    /// Persist a new status value. No transition validation is performed;
    /// callers and job bodies choose the next status.
    pub async fn set_status(&self, project_id: Uuid, status: ProjectStatus) -> Result<()> {
        self.storage.set_project_status(project_id, status).await
    }

    /// Sole entry point through which repository work reaches a backend.
    ///
    /// Transitions the project to `WaitSync` before enqueueing, so at most
    /// one sync is in flight given the dispatcher's per-project ordering.
    pub async fn start_repo_task(
        &self,
        project_id: Uuid,
        operation: RepoOperation,
    ) -> Result<JobHandle> {
        self.set_status(project_id, ProjectStatus::WaitSync).await?;

        tracing::info!(
            "Enqueueing repo {} for project {}",
            operation.as_str(),
            project_id
        );

        self.dispatcher
            .delay(Job::RepoSync {
                project_id,
                operation,
            })
            .await
    }

    /// Run a playbook against an inventory; returns the history id.
    pub async fn execute_playbook(
        &self,
        project_id: Uuid,
        playbook: &str,
        inventory_id: Uuid,
        options: ExecuteOptions,
    ) -> Result<Uuid> {
        self.execute(HistoryKind::Playbook, project_id, playbook, inventory_id, options)
            .await
    }

    /// Run a single module against an inventory; returns the history id.
    pub async fn execute_module(
        &self,
        project_id: Uuid,
        module: &str,
        inventory_id: Uuid,
        options: ExecuteOptions,
    ) -> Result<Uuid> {
        self.execute(HistoryKind::Module, project_id, module, inventory_id, options)
            .await
    }

    async fn execute(
        &self,
        kind: HistoryKind,
        project_id: Uuid,
        target: &str,
        inventory_id: Uuid,
        mut options: ExecuteOptions,
    ) -> Result<Uuid> {
        if target.is_empty() {
            return Err(Error::EmptyTargetName);
        }

        // Resolve references before creating the history record so a failed
        // lookup leaves no orphaned DELAY record behind.
        let inventory = self
            .storage
            .get_inventory(inventory_id)
            .await?
            .ok_or(Error::InventoryNotFound(inventory_id))?;
        let project = self
            .storage
            .get_project(project_id)
            .await?
            .ok_or(Error::ProjectNotFound(project_id))?;

        let history = History::new(target.to_string(), kind, project.id, inventory.id);
        let history = self.storage.create_history(history).await?;

        let sync = options.sync;
        options.sync = false;

        let job = Job::RunAnsible {
            project_id: project.id,
            inventory_id: inventory.id,
            history_id: history.id,
            kind,
            target: target.to_string(),
            options,
        };

        tracing::info!(
            "Dispatching {} '{}' on project {} (history {})",
            kind.as_str(),
            target,
            project.id,
            history.id
        );

        if sync {
            self.dispatcher.run_now(job).await?;
        } else {
            self.dispatcher.delay(job).await?;
        }

        Ok(history.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryStatus;
    use crate::inventory::Inventory;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemStorage {
        projects: Mutex<HashMap<Uuid, Project>>,
        inventories: Mutex<HashMap<Uuid, Inventory>>,
        histories: Mutex<HashMap<Uuid, History>>,
    }

    #[async_trait]
    impl Storage for MemStorage {
        async fn create_project(&self, project: Project) -> Result<Project> {
            self.projects
                .lock()
                .unwrap()
                .insert(project.id, project.clone());
            Ok(project)
        }

        async fn get_project(&self, id: Uuid) -> Result<Option<Project>> {
            Ok(self.projects.lock().unwrap().get(&id).cloned())
        }

        async fn set_project_status(&self, id: Uuid, status: ProjectStatus) -> Result<()> {
            let mut projects = self.projects.lock().unwrap();
            let project = projects.get_mut(&id).ok_or(Error::ProjectNotFound(id))?;
            project.status = status;
            Ok(())
        }

        async fn create_inventory(&self, inventory: Inventory) -> Result<Inventory> {
            self.inventories
                .lock()
                .unwrap()
                .insert(inventory.id, inventory.clone());
            Ok(inventory)
        }

        async fn get_inventory(&self, id: Uuid) -> Result<Option<Inventory>> {
            Ok(self.inventories.lock().unwrap().get(&id).cloned())
        }

        async fn create_history(&self, history: History) -> Result<History> {
            self.histories
                .lock()
                .unwrap()
                .insert(history.id, history.clone());
            Ok(history)
        }

        async fn get_history(&self, id: Uuid) -> Result<Option<History>> {
            Ok(self.histories.lock().unwrap().get(&id).cloned())
        }

        async fn set_history_status(&self, id: Uuid, status: HistoryStatus) -> Result<()> {
            let mut histories = self.histories.lock().unwrap();
            let history = histories.get_mut(&id).ok_or(Error::HistoryNotFound(id))?;
            history.status = status;
            Ok(())
        }

        async fn append_history_stdout(&self, id: Uuid, chunk: &str) -> Result<()> {
            let mut histories = self.histories.lock().unwrap();
            let history = histories.get_mut(&id).ok_or(Error::HistoryNotFound(id))?;
            history.raw_stdout.push_str(chunk);
            Ok(())
        }

        async fn finish_history(
            &self,
            id: Uuid,
            status: HistoryStatus,
            stop_time: DateTime<Utc>,
        ) -> Result<()> {
            let mut histories = self.histories.lock().unwrap();
            let history = histories.get_mut(&id).ok_or(Error::HistoryNotFound(id))?;
            history.status = status;
            history.stop_time = Some(stop_time);
            Ok(())
        }

        async fn histories_by_status(&self, status: HistoryStatus) -> Result<Vec<History>> {
            Ok(self
                .histories
                .lock()
                .unwrap()
                .values()
                .filter(|h| h.status == status)
                .cloned()
                .collect())
        }
    }

    /// Records jobs instead of executing them.
    #[derive(Default)]
    struct RecordingDispatcher {
        delayed: Mutex<Vec<Job>>,
        ran_now: Mutex<Vec<Job>>,
    }

    #[async_trait]
    impl Dispatcher for RecordingDispatcher {
        async fn delay(&self, job: Job) -> Result<JobHandle> {
            self.delayed.lock().unwrap().push(job);
            Ok(JobHandle::new())
        }

        async fn run_now(&self, job: Job) -> Result<()> {
            self.ran_now.lock().unwrap().push(job);
            Ok(())
        }
    }

    fn service() -> (ProjectService, Arc<MemStorage>, Arc<RecordingDispatcher>) {
        let storage = Arc::new(MemStorage::default());
        let dispatcher = Arc::new(RecordingDispatcher::default());
        (
            ProjectService::new(storage.clone(), dispatcher.clone()),
            storage,
            dispatcher,
        )
    }

    #[tokio::test]
    async fn test_create_triggers_clone_and_waits_for_sync() {
        let (service, _storage, dispatcher) = service();

        let project = service
            .create(NewProject::new(
                "web".to_string(),
                "https://git.example.org/ops/web.git".to_string(),
            ))
            .await
            .unwrap();

        assert_eq!(project.status, ProjectStatus::WaitSync);

        let delayed = dispatcher.delayed.lock().unwrap();
        assert_eq!(delayed.len(), 1);
        match &delayed[0] {
            Job::RepoSync {
                project_id,
                operation,
            } => {
                assert_eq!(*project_id, project.id);
                assert_eq!(*operation, RepoOperation::Clone);
            }
            other => panic!("unexpected job: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_attributes() {
        let (service, storage, dispatcher) = service();

        let result = service
            .create(NewProject::new("".to_string(), "repo".to_string()))
            .await;

        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(storage.projects.lock().unwrap().is_empty());
        assert!(dispatcher.delayed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_execute_playbook_creates_delayed_history() {
        let (service, storage, dispatcher) = service();

        let project = service
            .create(NewProject::new("web".to_string(), "repo".to_string()))
            .await
            .unwrap();
        let inventory = storage
            .create_inventory(Inventory::new("staging".to_string()))
            .await
            .unwrap();

        let history_id = service
            .execute_playbook(
                project.id,
                "site.yml",
                inventory.id,
                ExecuteOptions::default(),
            )
            .await
            .unwrap();

        let history = storage.get_history(history_id).await.unwrap().unwrap();
        assert_eq!(history.status, HistoryStatus::Delay);
        assert_eq!(history.kind, HistoryKind::Playbook);
        assert_eq!(history.raw_stdout, "");
        assert_eq!(history.name, "site.yml");

        // one clone job from create, one ansible job from execute
        let delayed = dispatcher.delayed.lock().unwrap();
        assert_eq!(delayed.len(), 2);
        match &delayed[1] {
            Job::RunAnsible {
                history_id: job_history,
                target,
                ..
            } => {
                assert_eq!(*job_history, history_id);
                assert_eq!(target, "site.yml");
            }
            other => panic!("unexpected job: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_execute_module_sync_runs_inline() {
        let (service, storage, dispatcher) = service();

        let project = service
            .create(NewProject::new("web".to_string(), "repo".to_string()))
            .await
            .unwrap();
        let inventory = storage
            .create_inventory(Inventory::new("staging".to_string()))
            .await
            .unwrap();

        let history_id = service
            .execute_module(project.id, "ping", inventory.id, ExecuteOptions::synchronous())
            .await
            .unwrap();

        let ran_now = dispatcher.ran_now.lock().unwrap();
        assert_eq!(ran_now.len(), 1);
        match &ran_now[0] {
            Job::RunAnsible {
                history_id: job_history,
                kind,
                options,
                ..
            } => {
                assert_eq!(*job_history, history_id);
                assert_eq!(*kind, HistoryKind::Module);
                // the sync flag is consumed by the service
                assert!(!options.sync);
            }
            other => panic!("unexpected job: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_target_creates_nothing() {
        let (service, storage, dispatcher) = service();

        let project = service
            .create(NewProject::new("web".to_string(), "repo".to_string()))
            .await
            .unwrap();
        let inventory = storage
            .create_inventory(Inventory::new("staging".to_string()))
            .await
            .unwrap();

        let jobs_before = dispatcher.delayed.lock().unwrap().len();

        let result = service
            .execute_playbook(project.id, "", inventory.id, ExecuteOptions::default())
            .await;

        assert!(matches!(result, Err(Error::EmptyTargetName)));
        assert!(storage.histories.lock().unwrap().is_empty());
        assert_eq!(dispatcher.delayed.lock().unwrap().len(), jobs_before);
    }

    #[tokio::test]
    async fn test_unknown_inventory_creates_nothing() {
        let (service, storage, dispatcher) = service();

        let project = service
            .create(NewProject::new("web".to_string(), "repo".to_string()))
            .await
            .unwrap();

        let jobs_before = dispatcher.delayed.lock().unwrap().len();
        let missing = Uuid::new_v4();

        let result = service
            .execute_module(project.id, "ping", missing, ExecuteOptions::default())
            .await;

        assert!(matches!(result, Err(Error::InventoryNotFound(id)) if id == missing));
        assert!(storage.histories.lock().unwrap().is_empty());
        assert_eq!(dispatcher.delayed.lock().unwrap().len(), jobs_before);
    }

    #[tokio::test]
    async fn test_set_status_is_idempotent() {
        let (service, storage, _dispatcher) = service();

        let project = service
            .create(NewProject::new("web".to_string(), "repo".to_string()))
            .await
            .unwrap();

        service
            .set_status(project.id, ProjectStatus::Ok)
            .await
            .unwrap();
        service
            .set_status(project.id, ProjectStatus::Ok)
            .await
            .unwrap();

        let stored = storage.get_project(project.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ProjectStatus::Ok);
    }

    #[tokio::test]
    async fn test_start_repo_task_sets_wait_sync_before_enqueue() {
        let (service, storage, dispatcher) = service();

        let project = service
            .create(NewProject::new("web".to_string(), "repo".to_string()))
            .await
            .unwrap();
        service
            .set_status(project.id, ProjectStatus::Ok)
            .await
            .unwrap();

        service
            .start_repo_task(project.id, RepoOperation::Sync)
            .await
            .unwrap();

        let stored = storage.get_project(project.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ProjectStatus::WaitSync);

        let delayed = dispatcher.delayed.lock().unwrap();
        match delayed.last().unwrap() {
            Job::RepoSync { operation, .. } => assert_eq!(*operation, RepoOperation::Sync),
            other => panic!("unexpected job: {:?}", other),
        }
    }
}

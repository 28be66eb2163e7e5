use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use strategos_core::{
    Error, History, HistoryStatus, Inventory, Project, ProjectStatus, Result, Storage,
};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory storage for tests and single-process deployments.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    projects: Arc<RwLock<HashMap<Uuid, Project>>>,
    inventories: Arc<RwLock<HashMap<Uuid, Inventory>>>,
    histories: Arc<RwLock<HashMap<Uuid, History>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_project(&self, project: Project) -> Result<Project> {
        let mut projects = self.projects.write().await;
        projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn get_project(&self, id: Uuid) -> Result<Option<Project>> {
        let projects = self.projects.read().await;
        Ok(projects.get(&id).cloned())
    }

    async fn set_project_status(&self, id: Uuid, status: ProjectStatus) -> Result<()> {
        let mut projects = self.projects.write().await;
        let project = projects.get_mut(&id).ok_or(Error::ProjectNotFound(id))?;
        project.status = status;
        Ok(())
    }

    async fn create_inventory(&self, inventory: Inventory) -> Result<Inventory> {
        let mut inventories = self.inventories.write().await;
        inventories.insert(inventory.id, inventory.clone());
        Ok(inventory)
    }

    async fn get_inventory(&self, id: Uuid) -> Result<Option<Inventory>> {
        let inventories = self.inventories.read().await;
        Ok(inventories.get(&id).cloned())
    }

    async fn create_history(&self, history: History) -> Result<History> {
        let mut histories = self.histories.write().await;
        histories.insert(history.id, history.clone());
        Ok(history)
    }

    async fn get_history(&self, id: Uuid) -> Result<Option<History>> {
        let histories = self.histories.read().await;
        Ok(histories.get(&id).cloned())
    }

    async fn set_history_status(&self, id: Uuid, status: HistoryStatus) -> Result<()> {
        let mut histories = self.histories.write().await;
        let history = histories.get_mut(&id).ok_or(Error::HistoryNotFound(id))?;
        history.status = status;
        Ok(())
    }

    async fn append_history_stdout(&self, id: Uuid, chunk: &str) -> Result<()> {
        let mut histories = self.histories.write().await;
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
        let mut histories = self.histories.write().await;
        let history = histories.get_mut(&id).ok_or(Error::HistoryNotFound(id))?;
        history.status = status;
        history.stop_time = Some(stop_time);
        Ok(())
    }

    async fn histories_by_status(&self, status: HistoryStatus) -> Result<Vec<History>> {
        let histories = self.histories.read().await;
        Ok(histories
            .values()
            .filter(|h| h.status == status)
            .cloned()
            .collect())
    }
}

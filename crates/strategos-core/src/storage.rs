use crate::history::{History, HistoryStatus};
use crate::inventory::Inventory;
use crate::project::{Project, ProjectStatus};
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Persistence collaborator: atomic create-and-return plus field-level
/// updates for the entities the dispatch core owns.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn create_project(&self, project: Project) -> Result<Project>;
    async fn get_project(&self, id: Uuid) -> Result<Option<Project>>;
    async fn set_project_status(&self, id: Uuid, status: ProjectStatus) -> Result<()>;

    async fn create_inventory(&self, inventory: Inventory) -> Result<Inventory>;
    async fn get_inventory(&self, id: Uuid) -> Result<Option<Inventory>>;

    async fn create_history(&self, history: History) -> Result<History>;
    async fn get_history(&self, id: Uuid) -> Result<Option<History>>;
    async fn set_history_status(&self, id: Uuid, status: HistoryStatus) -> Result<()>;
    async fn append_history_stdout(&self, id: Uuid, chunk: &str) -> Result<()>;
    async fn finish_history(
        &self,
        id: Uuid,
        status: HistoryStatus,
        stop_time: DateTime<Utc>,
    ) -> Result<()>;
    async fn histories_by_status(&self, status: HistoryStatus) -> Result<Vec<History>>;
}

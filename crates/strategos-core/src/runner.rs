use crate::history::HistoryKind;
use crate::inventory::Inventory;
use crate::job::ExecuteOptions;
use crate::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// One playbook or module invocation against an inventory.
#[derive(Debug, Clone)]
pub struct RunnerInvocation {
    pub kind: HistoryKind,
    pub target: String,
    pub inventory: Inventory,
    pub project_path: PathBuf,
    pub options: ExecuteOptions,
}

#[derive(Debug, Clone)]
pub struct RunnerOutcome {
    pub ok: bool,
    pub stdout: String,
}

/// Black-box ansible engine. The job executor persists the outcome onto the
/// History record; the runner only produces it.
#[async_trait]
pub trait PlaybookRunner: Send + Sync {
    async fn run(&self, invocation: RunnerInvocation) -> Result<RunnerOutcome>;
}

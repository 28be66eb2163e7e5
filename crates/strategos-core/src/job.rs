use crate::history::HistoryKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepoOperation {
    Clone,
    Sync,
}

impl RepoOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepoOperation::Clone => "clone",
            RepoOperation::Sync => "sync",
        }
    }
}

/// Caller-supplied execution options.
///
/// `sync` is consumed by the service to pick the dispatch mode and never
/// reaches the job body; everything else is passed through to the runner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecuteOptions {
    #[serde(default)]
    pub sync: bool,
    #[serde(default)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl ExecuteOptions {
    pub fn synchronous() -> Self {
        Self {
            sync: true,
            ..Default::default()
        }
    }

    pub fn with_extra(mut self, key: String, value: serde_json::Value) -> Self {
        self.extra.insert(key, value);
        self
    }
}

/// Unit of work handed to the dispatcher. Serializable so workers in other
/// processes can pick it up; everything else flows through storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Job {
    RepoSync {
        project_id: Uuid,
        operation: RepoOperation,
    },
    RunAnsible {
        project_id: Uuid,
        inventory_id: Uuid,
        history_id: Uuid,
        kind: HistoryKind,
        target: String,
        options: ExecuteOptions,
    },
}

impl Job {
    /// Serialization key: all jobs for one project execute in order.
    pub fn project_id(&self) -> Uuid {
        match self {
            Job::RepoSync { project_id, .. } => *project_id,
            Job::RunAnsible { project_id, .. } => *project_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub id: Uuid,
}

impl JobHandle {
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }
}

impl Default for JobHandle {
    fn default() -> Self {
        Self::new()
    }
}

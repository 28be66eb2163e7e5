use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Options forwarded to a backend for one sync operation.
pub type SyncOptions = HashMap<String, serde_json::Value>;

/// Captured output of one clone/update, persisted by the repo-sync job.
/// Both sides are absent for backends that run no external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutput {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

impl SyncOutput {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Pluggable clone/update strategy for one repository kind.
///
/// A backend is bound to a single project's working directory at
/// construction and holds no other state. Both operations must tolerate the
/// working directory being in any prior state: absent, partially cloned, or
/// deleted.
#[async_trait]
pub trait RepoBackend: Send + Sync {
    /// Fetch a fresh copy of the repository into the working directory.
    async fn make_clone(&self, options: &SyncOptions) -> Result<SyncOutput>;

    /// Bring an existing working directory up to date.
    async fn make_update(&self, options: &SyncOptions) -> Result<SyncOutput>;
}

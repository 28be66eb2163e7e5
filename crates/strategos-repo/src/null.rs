use crate::backend::{RepoBackend, SyncOptions, SyncOutput};
use crate::Result;
use async_trait::async_trait;

/// Default backend when no `repo_type` variable is set: performs no
/// filesystem action at all.
#[derive(Debug, Default)]
pub struct Null;

#[async_trait]
impl RepoBackend for Null {
    async fn make_clone(&self, _options: &SyncOptions) -> Result<SyncOutput> {
        Ok(SyncOutput::empty())
    }

    async fn make_update(&self, _options: &SyncOptions) -> Result<SyncOutput> {
        Ok(SyncOutput::empty())
    }
}

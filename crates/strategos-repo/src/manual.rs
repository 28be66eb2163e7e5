use crate::backend::{RepoBackend, SyncOptions, SyncOutput};
use crate::Result;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

/// Reference backend for repositories managed by hand: "cloning" is creating
/// the project's working directory, updating is a no-op.
#[derive(Debug)]
pub struct Manual {
    path: PathBuf,
}

impl Manual {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl RepoBackend for Manual {
    async fn make_clone(&self, _options: &SyncOptions) -> Result<SyncOutput> {
        match fs::create_dir(&self.path).await {
            Ok(()) => Ok(SyncOutput::empty()),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                // Stale working directory: drop it and retry the creation
                // once. It was just removed, so a second AlreadyExists
                // cannot recur.
                tracing::debug!("Removing stale working directory {:?}", self.path);
                fs::remove_dir_all(&self.path).await?;
                fs::create_dir(&self.path).await?;
                Ok(SyncOutput::empty())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn make_update(&self, _options: &SyncOptions) -> Result<SyncOutput> {
        Ok(SyncOutput::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clone_creates_working_directory() {
        let base = tempfile::tempdir().unwrap();
        let path = base.path().join("project");
        let backend = Manual::new(path.clone());

        let output = backend.make_clone(&SyncOptions::new()).await.unwrap();

        assert_eq!(output, SyncOutput::empty());
        assert!(path.is_dir());
    }

    #[tokio::test]
    async fn test_clone_replaces_existing_directory() {
        let base = tempfile::tempdir().unwrap();
        let path = base.path().join("project");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("stale.yml"), "leftover").unwrap();

        let backend = Manual::new(path.clone());
        let output = backend.make_clone(&SyncOptions::new()).await.unwrap();

        assert_eq!(output, SyncOutput::empty());
        assert!(path.is_dir());
        assert!(!path.join("stale.yml").exists());
    }

    #[tokio::test]
    async fn test_clone_propagates_other_failures() {
        // parent directory does not exist
        let backend = Manual::new(PathBuf::from("/nonexistent-base/project"));

        let result = backend.make_clone(&SyncOptions::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_update_is_a_noop_for_any_prior_state() {
        let base = tempfile::tempdir().unwrap();
        let absent = Manual::new(base.path().join("missing"));
        assert_eq!(
            absent.make_update(&SyncOptions::new()).await.unwrap(),
            SyncOutput::empty()
        );
        assert!(!base.path().join("missing").exists());

        let path = base.path().join("present");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("site.yml"), "---").unwrap();

        let present = Manual::new(path.clone());
        assert_eq!(
            present.make_update(&SyncOptions::new()).await.unwrap(),
            SyncOutput::empty()
        );
        assert!(path.join("site.yml").exists());
    }
}

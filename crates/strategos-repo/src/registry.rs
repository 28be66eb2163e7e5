use crate::backend::RepoBackend;
use crate::error::{Error, Result};
use crate::manual::Manual;
use crate::null::Null;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use strategos_core::Project;

pub type BackendFactory = Box<dyn Fn(&Project, PathBuf) -> Box<dyn RepoBackend> + Send + Sync>;

/// Named-handler lookup for repository backends, keyed by the project's
/// `repo_type` variable.
pub struct BackendRegistry {
    factories: HashMap<String, BackendFactory>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the built-in backends.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(
            "NULL",
            Box::new(|_project, _path| Box::new(Null) as Box<dyn RepoBackend>),
        );
        registry.register(
            "MANUAL",
            Box::new(|_project, path| Box::new(Manual::new(path)) as Box<dyn RepoBackend>),
        );
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, factory: BackendFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Resolve the backend governing `project`, bound to its working
    /// directory. An absent `repo_type` variable falls back to the no-op
    /// backend; a name with no registered factory is a configuration error.
    pub fn resolve(&self, project: &Project, projects_dir: &Path) -> Result<Box<dyn RepoBackend>> {
        match project.repo_type() {
            None => Ok(Box::new(Null)),
            Some(name) => {
                let factory = self
                    .factories
                    .get(name)
                    .ok_or_else(|| Error::UnknownType(name.to_string()))?;
                Ok(factory(project, project.work_dir(projects_dir)))
            }
        }
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{SyncOptions, SyncOutput};
    use strategos_core::REPO_TYPE_VAR;

    #[tokio::test]
    async fn test_missing_repo_type_falls_back_to_null() {
        let registry = BackendRegistry::builtin();
        let project = Project::new("p".to_string(), "repo".to_string());

        let backend = registry.resolve(&project, Path::new("/tmp")).unwrap();
        let output = backend.make_clone(&SyncOptions::new()).await.unwrap();

        assert_eq!(output, SyncOutput::empty());
        assert!(!Path::new("/tmp").join(project.id.to_string()).exists());
    }

    #[test]
    fn test_unknown_repo_type_is_a_configuration_error() {
        let registry = BackendRegistry::builtin();
        let project = Project::new("p".to_string(), "repo".to_string())
            .with_variable(REPO_TYPE_VAR.to_string(), "SVN".to_string());

        let result = registry.resolve(&project, Path::new("/tmp"));
        assert!(matches!(result, Err(Error::UnknownType(name)) if name == "SVN"));
    }

    #[test]
    fn test_manual_backend_resolves_to_project_work_dir() {
        let registry = BackendRegistry::builtin();
        let project = Project::new("p".to_string(), "repo".to_string())
            .with_variable(REPO_TYPE_VAR.to_string(), "MANUAL".to_string());

        assert!(registry.resolve(&project, Path::new("/tmp")).is_ok());
    }

    #[tokio::test]
    async fn test_custom_backend_registration() {
        let mut registry = BackendRegistry::new();
        registry.register(
            "NOOP",
            Box::new(|_project, _path| Box::new(Null) as Box<dyn RepoBackend>),
        );

        let project = Project::new("p".to_string(), "repo".to_string())
            .with_variable(REPO_TYPE_VAR.to_string(), "NOOP".to_string());

        let backend = registry.resolve(&project, Path::new("/tmp")).unwrap();
        assert!(backend.make_update(&SyncOptions::new()).await.is_ok());
    }
}

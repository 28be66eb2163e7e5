use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Variable key selecting the repository backend for a project.
pub const REPO_TYPE_VAR: &str = "repo_type";

/// Upper bound on the repository location string.
pub const REPOSITORY_MAX_LEN: usize = 2 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    New,
    WaitSync,
    Sync,
    Error,
    Ok,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::New => "NEW",
            ProjectStatus::WaitSync => "WAIT_SYNC",
            ProjectStatus::Sync => "SYNC",
            ProjectStatus::Error => "ERROR",
            ProjectStatus::Ok => "OK",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NEW" => Some(ProjectStatus::New),
            "WAIT_SYNC" => Some(ProjectStatus::WaitSync),
            "SYNC" => Some(ProjectStatus::Sync),
            "ERROR" => Some(ProjectStatus::Error),
            "OK" => Some(ProjectStatus::Ok),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub repository: String,
    pub status: ProjectStatus,
    pub variables: HashMap<String, String>,
    pub inventories: HashSet<Uuid>,
    pub hosts: HashSet<Uuid>,
    pub groups: HashSet<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: String, repository: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            repository,
            status: ProjectStatus::New,
            variables: HashMap::new(),
            inventories: HashSet::new(),
            hosts: HashSet::new(),
            groups: HashSet::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_variable(mut self, key: String, value: String) -> Self {
        self.variables.insert(key, value);
        self
    }

    pub fn with_variables(mut self, variables: HashMap<String, String>) -> Self {
        self.variables.extend(variables);
        self
    }

    /// Backend type name from the project's variable set, if configured.
    pub fn repo_type(&self) -> Option<&str> {
        self.variables.get(REPO_TYPE_VAR).map(String::as_str)
    }

    /// Working directory for this project, derived from its id.
    pub fn work_dir(&self, projects_dir: &Path) -> PathBuf {
        projects_dir.join(self.id.to_string())
    }
}

impl std::fmt::Display for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Attributes for creating a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub repository: String,
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

impl NewProject {
    pub fn new(name: String, repository: String) -> Self {
        Self {
            name,
            repository,
            variables: HashMap::new(),
        }
    }

    pub fn with_variable(mut self, key: String, value: String) -> Self {
        self.variables.insert(key, value);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Validation("project name is required".to_string()));
        }
        if self.repository.len() > REPOSITORY_MAX_LEN {
            return Err(Error::Validation(format!(
                "repository location exceeds {} characters",
                REPOSITORY_MAX_LEN
            )));
        }
        Ok(())
    }
}

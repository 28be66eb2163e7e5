use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use strategos_core::{History, HistoryKind, HistoryStatus, Inventory, Project, ProjectStatus};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectRecord {
    pub id: Uuid,
    pub name: String,
    pub repository: String,
    pub status: String,
    pub variables: String,
    pub inventories: Vec<Uuid>,
    pub hosts: Vec<Uuid>,
    pub groups: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl ProjectRecord {
    pub fn from_domain(project: &Project) -> Result<Self> {
        Ok(Self {
            id: project.id,
            name: project.name.clone(),
            repository: project.repository.clone(),
            status: project.status.as_str().to_string(),
            variables: serde_json::to_string(&project.variables)
                .map_err(|e| Error::Decode(e.to_string()))?,
            inventories: project.inventories.iter().copied().collect(),
            hosts: project.hosts.iter().copied().collect(),
            groups: project.groups.iter().copied().collect(),
            created_at: project.created_at,
        })
    }

    pub fn to_domain(&self) -> Result<Project> {
        let status = ProjectStatus::parse(&self.status)
            .ok_or_else(|| Error::Decode(format!("bad project status: {}", self.status)))?;
        let variables: HashMap<String, String> = serde_json::from_str(&self.variables)
            .map_err(|e| Error::Decode(e.to_string()))?;

        Ok(Project {
            id: self.id,
            name: self.name.clone(),
            repository: self.repository.clone(),
            status,
            variables,
            inventories: self.inventories.iter().copied().collect(),
            hosts: self.hosts.iter().copied().collect(),
            groups: self.groups.iter().copied().collect(),
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InventoryRecord {
    pub id: Uuid,
    pub name: String,
    pub variables: String,
    pub hosts: Vec<Uuid>,
    pub groups: Vec<Uuid>,
}

impl InventoryRecord {
    pub fn from_domain(inventory: &Inventory) -> Result<Self> {
        Ok(Self {
            id: inventory.id,
            name: inventory.name.clone(),
            variables: serde_json::to_string(&inventory.variables)
                .map_err(|e| Error::Decode(e.to_string()))?,
            hosts: inventory.hosts.iter().copied().collect(),
            groups: inventory.groups.iter().copied().collect(),
        })
    }

    pub fn to_domain(&self) -> Result<Inventory> {
        let variables: HashMap<String, String> = serde_json::from_str(&self.variables)
            .map_err(|e| Error::Decode(e.to_string()))?;

        Ok(Inventory {
            id: self.id,
            name: self.name.clone(),
            variables,
            hosts: self.hosts.iter().copied().collect(),
            groups: self.groups.iter().copied().collect(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HistoryRecord {
    pub id: Uuid,
    pub name: String,
    pub kind: String,
    pub status: String,
    pub start_time: DateTime<Utc>,
    pub stop_time: Option<DateTime<Utc>>,
    pub project_id: Uuid,
    pub inventory_id: Uuid,
    pub raw_stdout: String,
}

impl HistoryRecord {
    pub fn from_domain(history: &History) -> Self {
        Self {
            id: history.id,
            name: history.name.clone(),
            kind: history.kind.as_str().to_string(),
            status: history.status.as_str().to_string(),
            start_time: history.start_time,
            stop_time: history.stop_time,
            project_id: history.project_id,
            inventory_id: history.inventory_id,
            raw_stdout: history.raw_stdout.clone(),
        }
    }

    pub fn to_domain(&self) -> Result<History> {
        let kind = HistoryKind::parse(&self.kind)
            .ok_or_else(|| Error::Decode(format!("bad history kind: {}", self.kind)))?;
        let status = HistoryStatus::parse(&self.status)
            .ok_or_else(|| Error::Decode(format!("bad history status: {}", self.status)))?;

        Ok(History {
            id: self.id,
            name: self.name.clone(),
            kind,
            status,
            start_time: self.start_time,
            stop_time: self.stop_time,
            project_id: self.project_id,
            inventory_id: self.inventory_id,
            raw_stdout: self.raw_stdout.clone(),
        })
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryKind {
    Playbook,
    Module,
}

impl HistoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryKind::Playbook => "PLAYBOOK",
            HistoryKind::Module => "MODULE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PLAYBOOK" => Some(HistoryKind::Playbook),
            "MODULE" => Some(HistoryKind::Module),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryStatus {
    Delay,
    Run,
    Ok,
    Error,
}

impl HistoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryStatus::Delay => "DELAY",
            HistoryStatus::Run => "RUN",
            HistoryStatus::Ok => "OK",
            HistoryStatus::Error => "ERROR",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DELAY" => Some(HistoryStatus::Delay),
            "RUN" => Some(HistoryStatus::Run),
            "OK" => Some(HistoryStatus::Ok),
            "ERROR" => Some(HistoryStatus::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for HistoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Durable record of one dispatched execution.
///
/// Created in `Delay` before the job reaches the dispatcher; the id is the
/// only handle callers get for tracking the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    pub id: Uuid,
    pub name: String,
    pub kind: HistoryKind,
    pub status: HistoryStatus,
    pub start_time: DateTime<Utc>,
    pub stop_time: Option<DateTime<Utc>>,
    pub project_id: Uuid,
    pub inventory_id: Uuid,
    pub raw_stdout: String,
}

impl History {
    pub fn new(name: String, kind: HistoryKind, project_id: Uuid, inventory_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            kind,
            status: HistoryStatus::Delay,
            start_time: Utc::now(),
            stop_time: None,
            project_id,
            inventory_id,
            raw_stdout: String::new(),
        }
    }

    pub fn start(&mut self) {
        self.status = HistoryStatus::Run;
    }

    pub fn finish(&mut self, status: HistoryStatus) {
        self.status = status;
        self.stop_time = Some(Utc::now());
    }

    pub fn append_stdout(&mut self, chunk: &str) {
        self.raw_stdout.push_str(chunk);
    }
}

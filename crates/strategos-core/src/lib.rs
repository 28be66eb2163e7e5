pub mod project;
pub mod history;
pub mod inventory;
pub mod job;
pub mod storage;
pub mod dispatch;
pub mod runner;
pub mod service;
pub mod error;

// Re-exports
pub use project::{NewProject, Project, ProjectStatus, REPO_TYPE_VAR};
pub use history::{History, HistoryKind, HistoryStatus};
pub use inventory::{Group, Host, Inventory};
pub use job::{ExecuteOptions, Job, JobHandle, RepoOperation};
pub use storage::Storage;
pub use dispatch::Dispatcher;
pub use runner::{PlaybookRunner, RunnerInvocation, RunnerOutcome};
pub use service::ProjectService;
pub use error::{Error, Result};

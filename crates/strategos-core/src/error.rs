use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Empty playbook/module name.")]
    EmptyTargetName,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(Uuid),

    #[error("Inventory not found: {0}")]
    InventoryNotFound(Uuid),

    #[error("History record not found: {0}")]
    HistoryNotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Dispatch error: {0}")]
    Dispatch(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

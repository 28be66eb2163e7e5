use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Job references missing project: {0}")]
    MissingProject(Uuid),

    #[error("Job references missing inventory: {0}")]
    MissingInventory(Uuid),

    #[error("Queue closed: {0}")]
    QueueClosed(String),

    #[error("Core error: {0}")]
    Core(#[from] strategos_core::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

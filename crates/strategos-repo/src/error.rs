use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown repo_type: {0}")]
    UnknownType(String),

    #[error("Repository sync failed: {0}")]
    SyncFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

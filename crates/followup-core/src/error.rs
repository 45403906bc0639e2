use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no commitments to ingest")]
    NoCommitments,

    #[error("commitment task must not be empty")]
    EmptyTask,

    #[error("meeting not found: {0}")]
    MeetingNotFound(String),

    #[error("invalid priority: {0}")]
    InvalidPriority(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("index error: {0}")]
    Index(String),

    #[error("llm error: {0}")]
    Llm(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

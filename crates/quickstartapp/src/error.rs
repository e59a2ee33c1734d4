use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuickStartError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Workspace not found: {0}")]
    WorkspaceNotFound(String),

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Invariant violated: {0}")]
    Invariant(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, QuickStartError>;

use thiserror::Error;

/// Failures of the persistence collaborator
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("session snapshot could not be encoded: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session not found: {0}")]
    NotFound(String),
}

/// Failures surfaced by the practice controller. Game-flow no-ops are not errors.
#[derive(Debug, Error)]
pub enum PracticeError {
    #[error("a session is already active: {0}")]
    ActiveSessionExists(String),

    #[error("no active session")]
    NoActiveSession,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Watch link failures. Advisory only: they never interrupt local scoring.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("watch disconnected")]
    Disconnected,

    #[error("watch send failed: {0}")]
    Send(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
pub type Result<T> = std::result::Result<T, PracticeError>;

use thiserror::Error;

/// Errors from the warehouse engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("database lock poisoned")]
    LockPoisoned,

    #[error("blocking task failed: {0}")]
    Join(String),
}

impl From<tokio::task::JoinError> for EngineError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Join(err.to_string())
    }
}

use thiserror::Error;

/// Error type that captures common codex failures.
#[derive(Debug, Error)]
pub enum CodexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    Storage(String),
}

//! Error types for calc-history

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HistoryError {
    #[error("History record not found: {0}")]
    NotFound(String),

    /// Remote log unreachable, timed out or answered with a non-success status
    #[error("Remote history unavailable: {0}")]
    Transport(String),

    #[error("Local history storage error: {0}")]
    Storage(String),

    #[error("History serialization error: {0}")]
    Serialization(String),
}

impl HistoryError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

impl From<serde_json::Error> for HistoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for HistoryError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HistoryError>;

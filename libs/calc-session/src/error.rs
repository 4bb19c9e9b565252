//! Error types for calc-session

use thiserror::Error;

/// Evaluation failure reported to the user
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// Denylist hit; no evaluator was called
    #[error("Unsafe expression rejected: {0}")]
    UnsafeExpression(String),

    #[error("Calculation failed for '{expression}': {message}")]
    Eval { expression: String, message: String },
}

impl PipelineError {
    pub fn eval(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Eval {
            expression: expression.into(),
            message: message.into(),
        }
    }

    /// Expression the failure refers to
    pub fn expression(&self) -> &str {
        match self {
            Self::UnsafeExpression(expression) => expression,
            Self::Eval { expression, .. } => expression,
        }
    }
}

/// Remote evaluator failure; always recovered by falling back to local evaluation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RemoteError {
    #[error("Remote evaluator unreachable: {0}")]
    Transport(String),

    #[error("Remote evaluator timed out after {0} ms")]
    Timeout(u64),

    #[error("Remote evaluator returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed remote response: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failure while wiring a client from its configuration
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] common::Error),

    #[error("Failed to initialise evaluator: {0}")]
    Engine(#[from] calc_engine::CalcError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Failed to initialise history: {0}")]
    History(#[from] calc_history::HistoryError),
}

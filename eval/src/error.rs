use pathrank_core::CoreError;
use thiserror::Error;

/// Result type alias for evaluation operations.
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors surfaced by the evaluation harness.
///
/// Statistical functions and report generators never fail; errors come
/// from malformed configuration, unknown datasets, or the core engine.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("unknown benchmark dataset: {0}")]
    UnknownDataset(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

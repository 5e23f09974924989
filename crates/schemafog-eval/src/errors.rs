use thiserror::Error;

/// Errors emitted while setting up verification.
///
/// A failing query is an outcome, not an error.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, EvalError>;

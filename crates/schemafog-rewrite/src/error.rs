use thiserror::Error;

/// Failures while rewriting benchmark SQL.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// The input is not a statement the SQLite dialect accepts.
    #[error("failed to parse SQL ({message}): {sql}")]
    Parse { sql: String, message: String },
    /// The rewritten tree serialized to text that no longer parses.
    #[error("rewritten SQL does not parse ({message}): {sql}")]
    Serialization { sql: String, message: String },
    #[error("expected one statement, found {count}: {sql}")]
    MultipleStatements { sql: String, count: usize },
    /// A benchmark sample carries no gold SQL.
    #[error("invalid sample for '{db_id}': {message}")]
    InvalidSample { db_id: String, message: String },
    #[error(transparent)]
    Core(#[from] schemafog_core::Error),
}

pub type Result<T> = std::result::Result<T, RewriteError>;

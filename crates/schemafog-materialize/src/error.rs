use thiserror::Error;

/// Failures while rebuilding one anonymized store.
#[derive(Debug, Error)]
pub enum MaterializeError {
    /// Connection, query, or decode failure reported by the driver.
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    /// The store rejected a generated `CREATE TABLE`.
    #[error("failed to execute DDL ({message}):\n{statement}")]
    DdlExecution { statement: String, message: String },
    /// The copied table does not hold as many rows as its source.
    #[error("row count mismatch for table '{table}': expected {expected}, found {found}")]
    RowCountMismatch {
        table: String,
        expected: i64,
        found: i64,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Core(#[from] schemafog_core::Error),
}

pub type Result<T> = std::result::Result<T, MaterializeError>;

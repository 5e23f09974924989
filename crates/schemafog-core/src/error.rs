use thiserror::Error;

/// Core error type shared across schemafog crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem failure while reading or writing artifacts.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON artifact could not be decoded or encoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// Unknown dataset, unknown level, or an unusable configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A mapping was used before it was generated, or does not cover an identifier.
    #[error("mapping state error: {0}")]
    MappingState(String),
    /// The schema description violates internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

/// Convenience alias for results returned by schemafog crates.
pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

/// Core error type shared across Linea crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Database error or store failure.
    #[error("database error: {0}")]
    Db(String),
    /// The edge set violates internal invariants.
    #[error("invalid edge set: {0}")]
    InvalidEdges(String),
    /// A requested capability is not supported by the engine.
    #[error("unsupported: {0}")]
    Unsupported(String),
    /// Catch-all error for unexpected failures.
    #[error("other error: {0}")]
    Other(String),
}

/// Convenience alias for results returned by Linea crates.
pub type Result<T> = std::result::Result<T, Error>;

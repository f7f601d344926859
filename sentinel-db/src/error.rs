//! Error types for the Sentinel store

use thiserror::Error;

/// Store error types
#[derive(Error, Debug)]
pub enum Error {
    /// Query or connection failure
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Schema migration failed
    #[error("Migration error: {0}")]
    Migration(String),

    /// Database file or directory could not be created
    #[error("IO error: {0}")]
    Io(String),

    /// Stored JSON column could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Row contents violate an expected invariant
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, Error>;

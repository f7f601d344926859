//! Error types for Sentinel

use thiserror::Error;

/// Result type alias for Sentinel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Sentinel operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Language model request failed
    #[error("Model error: {0}")]
    Model(String),

    /// Code host or web request failed
    #[error("Remote fetch error: {0}")]
    Remote(String),

    /// Tree cache store unavailable
    #[error("Cache error: {0}")]
    Cache(String),

    /// Agent loop error
    #[error("Agent error: {0}")]
    Agent(String),

    /// Job record error
    #[error("Job error: {0}")]
    Job(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Remote(err.to_string())
    }
}

//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// GitHub API error
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// Authentication error
    #[error("GitHub authentication error: {0}")]
    Auth(String),

    /// Repository not found or not visible with the current token
    #[error("Repository {0} not found")]
    RepoNotFound(String),

    /// Pull request not found
    #[error("Pull request #{0} not found")]
    PrNotFound(u64),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Blob content could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl From<Error> for sentinel_core::Error {
    fn from(err: Error) -> Self {
        sentinel_core::Error::Remote(err.to_string())
    }
}

/// Whether an octocrab error is GitHub's 404 response
pub(crate) fn is_not_found(err: &octocrab::Error) -> bool {
    matches!(err, octocrab::Error::GitHub { source, .. } if source.message.contains("Not Found"))
}

//! Sentinel GitHub - GitHub code host for Sentinel
//!
//! Lists a repository's recursive tree, fetches blob contents and lists the
//! files changed by a pull request, exposed to the reviewer through
//! [`sentinel_core::repo::CodeHost`].

mod client;
mod content;
mod error;
mod host;
mod pr;
mod tree;

pub use client::{parse_github_url, GitHubClient};
pub use content::{blob_route, Blob};
pub use error::{Error, Result};
pub use tree::{GitTree, GitTreeItem};

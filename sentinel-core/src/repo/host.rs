//! Code host abstraction
//!
//! The tree builder and the review driver talk to the remote repository only
//! through [`CodeHost`]. `sentinel-github` provides the GitHub implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Kind of an entry in a flat repository listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder,
}

/// One path from a recursive repository listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Slash-delimited path relative to the repository root
    pub path: String,
    pub kind: EntryKind,
    /// Locator used to fetch the blob content (files only)
    pub url: Option<String>,
    pub sha: String,
    pub size: Option<u64>,
}

impl TreeEntry {
    pub fn file(path: impl Into<String>, url: impl Into<String>, sha: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
            url: Some(url.into()),
            sha: sha.into(),
            size: Some(size),
        }
    }

    pub fn folder(path: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Folder,
            url: None,
            sha: sha.into(),
            size: None,
        }
    }
}

/// Full recursive listing of a repository's default branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeListing {
    /// Hash of the root tree
    pub sha: String,
    pub entries: Vec<TreeEntry>,
}

/// A file touched by a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    /// Unified diff hunk; absent for binary or very large files
    pub patch: Option<String>,
}

/// Remote repository operations needed by the reviewer
#[async_trait]
pub trait CodeHost: Send + Sync {
    /// Repository identifier in `owner/repo` form
    fn repository(&self) -> String;

    /// Fetch the recursive flat listing of the default branch
    async fn tree_listing(&self) -> Result<TreeListing>;

    /// Fetch and decode a file's content by its blob locator
    async fn blob_content(&self, blob_url: &str) -> Result<String>;

    /// List the files changed by a pull request
    async fn changed_files(&self, pr_number: u64) -> Result<Vec<ChangedFile>>;
}

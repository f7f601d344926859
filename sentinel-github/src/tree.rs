//! Recursive git tree listing

use serde::Deserialize;
use sentinel_core::repo::{EntryKind, TreeEntry, TreeListing};
use tracing::{debug, warn};

use crate::error::is_not_found;
use crate::{Error, GitHubClient, Result};

/// Response of `GET /repos/{owner}/{repo}/git/trees/{sha}?recursive=1`
#[derive(Debug, Clone, Deserialize)]
pub struct GitTree {
    pub sha: String,
    #[serde(default)]
    pub tree: Vec<GitTreeItem>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitTreeItem {
    pub path: String,
    /// `blob`, `tree` or `commit` (submodule)
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
}

impl From<GitTree> for TreeListing {
    /// Keep blobs as files and trees as folders; submodules are dropped
    fn from(tree: GitTree) -> Self {
        let entries = tree
            .tree
            .into_iter()
            .filter_map(|item| match item.kind.as_str() {
                "blob" => Some(TreeEntry {
                    path: item.path,
                    kind: EntryKind::File,
                    url: item.url,
                    sha: item.sha,
                    size: item.size,
                }),
                "tree" => Some(TreeEntry::folder(item.path, item.sha)),
                _ => None,
            })
            .collect();

        TreeListing {
            sha: tree.sha,
            entries,
        }
    }
}

impl GitHubClient {
    /// Fetch the full recursive tree of the default branch
    pub async fn git_tree(&self) -> Result<GitTree> {
        let branch = self.default_branch().await?;
        let route = format!(
            "/repos/{}/{}/git/trees/{}",
            self.owner(),
            self.repo(),
            branch
        );
        debug!(%route, "Fetching recursive tree");

        let tree: GitTree = self
            .client()
            .get(route, Some(&[("recursive", "1")]))
            .await
            .map_err(|e| {
                if is_not_found(&e) {
                    Error::RepoNotFound(self.full_name())
                } else {
                    Error::Api(e)
                }
            })?;

        if tree.truncated {
            warn!(
                repo = %self.full_name(),
                entries = tree.tree.len(),
                "GitHub truncated the tree listing"
            );
        }
        Ok(tree)
    }
}

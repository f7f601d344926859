//! [`CodeHost`] implementation for GitHub

use async_trait::async_trait;
use sentinel_core::repo::{ChangedFile, CodeHost, TreeListing};

use crate::GitHubClient;

#[async_trait]
impl CodeHost for GitHubClient {
    fn repository(&self) -> String {
        self.full_name()
    }

    async fn tree_listing(&self) -> sentinel_core::Result<TreeListing> {
        Ok(self.git_tree().await?.into())
    }

    async fn blob_content(&self, blob_url: &str) -> sentinel_core::Result<String> {
        Ok(self.blob_text(blob_url).await?)
    }

    async fn changed_files(&self, pr_number: u64) -> sentinel_core::Result<Vec<ChangedFile>> {
        Ok(self.pr_files(pr_number).await?)
    }
}

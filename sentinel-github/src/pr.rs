//! Pull request file listing

use octocrab::models::repos::DiffEntry;
use sentinel_core::repo::ChangedFile;
use tracing::{debug, info};

use crate::error::is_not_found;
use crate::{Error, GitHubClient, Result};

fn changed_file(entry: DiffEntry) -> ChangedFile {
    ChangedFile {
        filename: entry.filename,
        patch: entry.patch,
    }
}

impl GitHubClient {
    /// List every file changed by a pull request, following pagination
    pub async fn pr_files(&self, number: u64) -> Result<Vec<ChangedFile>> {
        debug!(number, "Listing pull request files");

        let first = self
            .client()
            .pulls(self.owner(), self.repo())
            .list_files(number)
            .await
            .map_err(|e| {
                if is_not_found(&e) {
                    Error::PrNotFound(number)
                } else {
                    Error::Api(e)
                }
            })?;

        let entries = self.client().all_pages(first).await?;
        let files: Vec<ChangedFile> = entries.into_iter().map(changed_file).collect();

        info!(
            number,
            count = files.len(),
            with_patch = files.iter().filter(|f| f.patch.is_some()).count(),
            "Fetched pull request files"
        );
        Ok(files)
    }
}

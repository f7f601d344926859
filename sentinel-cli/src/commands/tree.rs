//! Tree command - print a repository's cached file tree

use clap::Args;
use sentinel_core::{Config, RepositoryTree};
use sentinel_github::GitHubClient;

use super::open_database;

/// Arguments for the tree command
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Repository as owner/repo or a GitHub URL
    pub repo: String,

    /// Ignore the cached tree and fetch a fresh listing
    #[arg(long)]
    pub refresh: bool,
}

impl TreeArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let client = GitHubClient::from_url(&self.repo)
            .map_err(|e| anyhow::anyhow!("Failed to create GitHub client: {}", e))?;
        let db = open_database(config).await?;

        let tree = if self.refresh {
            RepositoryTree::rebuild(&client, &db).await
        } else {
            RepositoryTree::load(&client, &db).await
        }
        .map_err(|e| anyhow::anyhow!("Failed to load tree for {}: {}", client.full_name(), e))?;

        print!("{}", tree.render());
        eprintln!(
            "{}: {} files, {} folders",
            tree.repository(),
            tree.file_count(),
            tree.folder_count()
        );

        Ok(())
    }
}

//! Review command - review every changed file of a pull request

use std::sync::Arc;

use clap::Args;
use sentinel_core::job::{self, JobStatus};
use sentinel_core::tools::search;
use sentinel_core::{CodeHost, Config, OllamaChat, PullRequestReview, ReviewDriver};
use sentinel_github::GitHubClient;
use tracing::info;

use super::open_database;

/// Arguments for the review command
#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// Repository as owner/repo or a GitHub URL
    pub repo: String,

    /// Pull request number
    pub pr: u64,

    /// Print the review as JSON
    #[arg(long)]
    pub json: bool,

    /// Task id to record the job under (generated when omitted)
    #[arg(long)]
    pub task_id: Option<String>,
}

impl ReviewArgs {
    /// Execute the review command
    pub async fn execute(&self, verbose: bool, config: &Config) -> anyhow::Result<()> {
        let client = GitHubClient::from_url(&self.repo)
            .map_err(|e| anyhow::anyhow!("Failed to create GitHub client: {}", e))?;
        let host: Arc<dyn CodeHost> = Arc::new(client);
        let model = Arc::new(
            OllamaChat::new(&config.agent)
                .map_err(|e| anyhow::anyhow!("Failed to create model client: {}", e))?,
        );
        let search = search::from_config(&config.search)
            .map_err(|e| anyhow::anyhow!("Failed to create search client: {}", e))?;
        let db = open_database(config).await?;

        let task_id = self
            .task_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        job::submit(&db, &task_id).await?;
        eprintln!("Task: {}", task_id);

        if verbose {
            info!(
                repository = %host.repository(),
                pr = self.pr,
                model = %config.agent.model,
                "Starting review"
            );
        }

        let work = {
            let db = db.clone();
            let pr = self.pr;
            let max_steps = config.agent.max_steps;
            async move {
                let driver = ReviewDriver::prepare(host, &db, model, search, max_steps).await?;
                driver.review(pr).await
            }
        };

        let record = job::run_job(&db, &task_id, work).await?;

        if record.status != JobStatus::Completed {
            anyhow::bail!(
                "Review failed: {}",
                record.error.as_deref().unwrap_or("unknown error")
            );
        }

        let results = record.results.unwrap_or_default();
        if self.json {
            println!("{}", serde_json::to_string_pretty(&results)?);
        } else {
            let review: PullRequestReview = serde_json::from_value(results)?;
            print!("{}", format_review(&review));
        }

        Ok(())
    }
}

/// Human-readable rendering of a finished review
fn format_review(review: &PullRequestReview) -> String {
    let mut out = String::new();

    for file in &review.files {
        out.push_str(&format!("{}\n", file.name));
        if file.issues.is_empty() {
            out.push_str("  no issues\n");
        }
        for issue in &file.issues {
            out.push_str(&format!(
                "  L{} [{}] {}\n",
                issue.line_number, issue.kind, issue.description
            ));
            if !issue.suggestion.is_empty() {
                out.push_str(&format!("      suggestion: {}\n", issue.suggestion));
            }
        }
    }

    out.push_str(&format!(
        "\n{} files, {} issues ({} critical)\n",
        review.summary.total_files, review.summary.total_issues, review.summary.critical_issues
    ));
    out
}

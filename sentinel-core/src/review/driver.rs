//! Runs the review agent over every changed file of a pull request

use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use super::types::{FinalAnswer, PullRequestReview};
use crate::agent::prompts::file_input;
use crate::agent::ReviewAgent;
use crate::llm::ChatModel;
use crate::repo::{CodeHost, RepositoryTree, TreeCache};
use crate::tools::{Toolbox, WebSearch};
use crate::Result;

pub struct ReviewDriver {
    host: Arc<dyn CodeHost>,
    agent: ReviewAgent,
}

impl ReviewDriver {
    pub fn new(host: Arc<dyn CodeHost>, agent: ReviewAgent) -> Self {
        Self { host, agent }
    }

    /// Load the repository tree through `cache` and assemble the agent
    pub async fn prepare(
        host: Arc<dyn CodeHost>,
        cache: &dyn TreeCache,
        model: Arc<dyn ChatModel>,
        search: Arc<dyn WebSearch>,
        max_steps: usize,
    ) -> Result<Self> {
        let tree = Arc::new(RepositoryTree::load(host.as_ref(), cache).await?);
        let toolbox = Toolbox::new(search, host.clone(), tree);
        Ok(Self::new(host, ReviewAgent::new(model, toolbox, max_steps)))
    }

    /// Review each changed file in turn and aggregate the answers
    ///
    /// Files without a patch (binary or oversized) are skipped.
    pub async fn review(&self, pr_number: u64) -> Result<PullRequestReview> {
        let repository = self.host.repository();
        let span = info_span!("review", %repository, pr_number);

        async {
            let changed = self.host.changed_files(pr_number).await?;
            info!(files = changed.len(), "Reviewing pull request");

            let mut answers = Vec::new();
            for file in &changed {
                let Some(patch) = file.patch.as_deref() else {
                    info!(file = %file.filename, "Skipping file without patch");
                    continue;
                };

                let state = self.agent.run(&file_input(&file.filename, patch)).await?;
                let termination = state.termination();
                let mut answer: FinalAnswer = state.output.unwrap_or_default();
                if answer.file.name.is_empty() {
                    answer.file.name = file.filename.clone();
                }

                info!(
                    file = %file.filename,
                    issues = answer.file.issues.len(),
                    termination = ?termination,
                    "File reviewed"
                );
                answers.push(answer);
            }

            Ok::<_, crate::Error>(PullRequestReview::aggregate(answers))
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for ReviewDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewDriver")
            .field("repository", &self.host.repository())
            .field("agent", &self.agent)
            .finish()
    }
}

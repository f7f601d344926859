//! GitHub API client using octocrab

use crate::error::is_not_found;
use crate::{Error, Result};
use octocrab::Octocrab;
use sentinel_core::Secrets;
use tracing::{debug, info};

/// GitHub API client bound to one repository
pub struct GitHubClient {
    client: Octocrab,
    owner: String,
    repo: String,
}

impl GitHubClient {
    /// Create a client for the repository, authenticating from secrets
    ///
    /// Token is loaded from (in priority order):
    /// 1. GITHUB_TOKEN environment variable
    /// 2. ~/.config/sentinel/secrets.toml
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Result<Self> {
        let secrets = Secrets::load().map_err(|e| Error::Auth(e.to_string()))?;

        let token = secrets.github_token().ok_or_else(|| {
            Error::Auth(
                "GitHub token not found. Set GITHUB_TOKEN environment variable \
                 or add token to ~/.config/sentinel/secrets.toml"
                    .to_string(),
            )
        })?;

        Self::with_token(owner, repo, token)
    }

    /// Create a client with an explicit personal access token
    pub fn with_token(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        let owner = owner.into();
        let repo = repo.into();

        let client = Octocrab::builder()
            .personal_token(token.into())
            .build()
            .map_err(|e| Error::Auth(format!("Failed to create GitHub client: {}", e)))?;

        info!(owner = %owner, repo = %repo, "Created GitHub client");

        Ok(Self {
            client,
            owner,
            repo,
        })
    }

    /// Create a GitHub client from a repository URL
    ///
    /// Supports formats:
    /// - owner/repo
    /// - https://github.com/owner/repo
    /// - git@github.com:owner/repo.git
    pub fn from_url(url: &str) -> Result<Self> {
        let (owner, repo) = parse_github_url(url)?;
        Self::new(owner, repo)
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// `owner/repo`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    pub fn client(&self) -> &Octocrab {
        &self.client
    }

    /// Name of the repository's default branch
    pub async fn default_branch(&self) -> Result<String> {
        debug!(repo = %self.full_name(), "Fetching repository metadata");

        let repo = self
            .client
            .repos(&self.owner, &self.repo)
            .get()
            .await
            .map_err(|e| {
                if is_not_found(&e) {
                    Error::RepoNotFound(self.full_name())
                } else {
                    Error::Api(e)
                }
            })?;

        repo.default_branch
            .ok_or_else(|| Error::Other(format!("{} has no default branch", self.full_name())))
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}

/// Parse a GitHub URL into owner and repo
pub fn parse_github_url(url: &str) -> Result<(String, String)> {
    let url = url.trim();
    let invalid = || {
        Error::Parse(format!(
            "Invalid repository format: {}. Expected owner/repo",
            url
        ))
    };

    if url.starts_with("https://") || url.starts_with("http://") {
        let parsed = url::Url::parse(url).map_err(|e| Error::Parse(e.to_string()))?;
        return split_owner_repo(parsed.path())
            .ok_or_else(|| Error::Parse(format!("Invalid GitHub URL path: {}", parsed.path())));
    }

    if let Some(rest) = url.strip_prefix("git@") {
        return rest
            .split_once(':')
            .and_then(|(_, path)| split_owner_repo(path))
            .ok_or_else(|| Error::Parse(format!("Invalid SSH URL: {}", url)));
    }

    if url.contains(':') {
        return Err(invalid());
    }

    // Shorthand must be exactly owner/repo
    match url.split('/').collect::<Vec<_>>().as_slice() {
        [owner, repo] if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.trim_end_matches(".git").to_string()))
        }
        _ => Err(invalid()),
    }
}

fn split_owner_repo(path: &str) -> Option<(String, String)> {
    let path = path.trim_matches('/').trim_end_matches(".git");
    let mut parts = path.split('/');
    match (parts.next(), parts.next()) {
        (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => {
            Some((owner.to_string(), repo.to_string()))
        }
        _ => None,
    }
}

//! Sentinel Core - pull request review agent
//!
//! A language model reviews each changed file of a pull request by choosing
//! tools in a loop: web search, the repository tree, file contents, and
//! finally a structured answer. The repository tree is built once from the
//! code host's listing and kept in a cache.

pub mod agent;
pub mod config;
#[cfg(feature = "database")]
mod database;
pub mod error;
pub mod job;
pub mod llm;
pub mod repo;
pub mod review;
pub mod secrets;
pub mod tools;

#[cfg(test)]
pub(crate) mod test_support;

pub use agent::{AgentAction, AgentState, Decision, ReviewAgent, Termination};
pub use config::Config;
pub use error::{Error, Result};
pub use job::{JobRecord, JobStatus, JobStore, MemoryJobStore};
pub use llm::{ChatMessage, ChatModel, OllamaChat};
pub use repo::{CodeHost, MemoryCache, RepositoryTree, TreeCache};
pub use review::{FinalAnswer, PullRequestReview, ReviewDriver};
pub use secrets::Secrets;
pub use tools::{ToolName, Toolbox, WebSearch};

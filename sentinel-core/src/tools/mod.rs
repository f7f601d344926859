//! Tool registry for the review agent
//!
//! The agent can call exactly four tools. [`ToolName`] is the closed set of
//! canonical names, [`ToolCall`] is a validated invocation, and [`Toolbox`]
//! dispatches calls against the shared repository tree, code host and search
//! engine. Dispatch never fails: tool errors come back as advisory
//! observations the model can read.

pub mod search;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::repo::{CodeHost, RepositoryTree};
use crate::review::FinalAnswer;
use crate::{Error, Result};

pub use search::{DuckDuckGo, Google, SearchResult, WebSearch};

/// Canonical tool names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    WebSearch,
    RepoFileTreeStructure,
    RepoFileContent,
    FinalAnswer,
}

impl ToolName {
    /// All tools, in the order they are presented to the model
    pub fn all() -> &'static [ToolName] {
        &[
            ToolName::WebSearch,
            ToolName::RepoFileTreeStructure,
            ToolName::RepoFileContent,
            ToolName::FinalAnswer,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::WebSearch => "web_search",
            ToolName::RepoFileTreeStructure => "repo_file_tree_structure",
            ToolName::RepoFileContent => "repo_file_content",
            ToolName::FinalAnswer => "final_answer",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolName::WebSearch => {
                "Search the web for documentation or known issues. Returns a JSON list of results with title, link and snippet."
            }
            ToolName::RepoFileTreeStructure => {
                "Returns the file tree of the repository. Files are listed as -name, folders as |name, nesting is shown by indentation. No input needed."
            }
            ToolName::RepoFileContent => {
                "Returns the entire content of a repository file, given its path from the repository root."
            }
            ToolName::FinalAnswer => {
                "Report the review of the file. file.issues lists each finding with its type, description, line_number and suggestion. summary holds total_files, total_issues and critical_issues. Calling this ends the review."
            }
        }
    }

    /// Input contract as `{key: type}`
    pub fn parameters(&self) -> Value {
        match self {
            ToolName::WebSearch => serde_json::json!({"query": "string"}),
            ToolName::RepoFileTreeStructure => serde_json::json!({}),
            ToolName::RepoFileContent => serde_json::json!({"file_path": "string"}),
            ToolName::FinalAnswer => serde_json::json!({
                "file": {
                    "name": "string",
                    "issues": [{
                        "type": "string",
                        "description": "string",
                        "line_number": "integer",
                        "suggestion": "string"
                    }]
                },
                "summary": {
                    "total_files": "integer",
                    "total_issues": "integer",
                    "critical_issues": "integer"
                }
            }),
        }
    }

    /// Description block shown to the model
    pub fn render(&self) -> String {
        let schema = serde_json::json!({
            "name": self.as_str(),
            "parameters": self.parameters(),
        });
        format!("{}\n{}", schema, self.description())
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ToolName {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ToolName::all()
            .iter()
            .copied()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| format!("Unknown tool: {}", s))
    }
}

/// Render every tool for the system instruction
pub fn render_tool_list() -> String {
    ToolName::all()
        .iter()
        .map(ToolName::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// A validated tool invocation
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    WebSearch { query: String },
    RepoFileTreeStructure,
    RepoFileContent { file_path: String },
    FinalAnswer(FinalAnswer),
}

impl ToolCall {
    /// Check the model's parameters against the tool's input contract
    pub fn parse(tool: ToolName, parameters: &Value) -> Result<Self> {
        match tool {
            ToolName::WebSearch => Ok(ToolCall::WebSearch {
                query: string_param(parameters, "query")?,
            }),
            ToolName::RepoFileTreeStructure => Ok(ToolCall::RepoFileTreeStructure),
            ToolName::RepoFileContent => Ok(ToolCall::RepoFileContent {
                file_path: string_param(parameters, "file_path")?,
            }),
            ToolName::FinalAnswer => Ok(ToolCall::FinalAnswer(FinalAnswer::from_parameters(
                parameters,
            ))),
        }
    }

    pub fn tool(&self) -> ToolName {
        match self {
            ToolCall::WebSearch { .. } => ToolName::WebSearch,
            ToolCall::RepoFileTreeStructure => ToolName::RepoFileTreeStructure,
            ToolCall::RepoFileContent { .. } => ToolName::RepoFileContent,
            ToolCall::FinalAnswer(_) => ToolName::FinalAnswer,
        }
    }
}

fn string_param(parameters: &Value, key: &str) -> Result<String> {
    parameters
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::Agent(format!("missing string parameter `{}`", key)))
}

/// Result of dispatching one tool call
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// Text fed back to the model on the next decision
    Observation(String),
    /// Final payload; ends the run
    Answer(FinalAnswer),
}

/// Observation returned when a file path does not resolve
pub fn file_not_found(path: &str) -> String {
    format!("File not found in repository: {}", path)
}

/// Observation returned in place of a tool error
pub fn unusable(tool: ToolName, err: &Error) -> String {
    format!(
        "{} is currently unusable: {}. Do not select {} again.",
        tool, err, tool
    )
}

/// Shared capabilities the tools run against
#[derive(Clone)]
pub struct Toolbox {
    search: Arc<dyn WebSearch>,
    host: Arc<dyn CodeHost>,
    tree: Arc<RepositoryTree>,
}

impl Toolbox {
    pub fn new(
        search: Arc<dyn WebSearch>,
        host: Arc<dyn CodeHost>,
        tree: Arc<RepositoryTree>,
    ) -> Self {
        Self { search, host, tree }
    }

    pub fn tree(&self) -> &RepositoryTree {
        &self.tree
    }

    /// Validate and run a tool
    pub async fn dispatch(&self, tool: ToolName, parameters: &Value) -> ToolOutcome {
        let call = match ToolCall::parse(tool, parameters) {
            Ok(call) => call,
            Err(e) => {
                warn!(%tool, error = %e, "Rejected tool input");
                return ToolOutcome::Observation(unusable(tool, &e));
            }
        };

        debug!(%tool, "Dispatching tool");
        match self.execute(call).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(%tool, error = %e, "Tool failed");
                ToolOutcome::Observation(unusable(tool, &e))
            }
        }
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolOutcome> {
        let text = match call {
            ToolCall::WebSearch { query } => {
                let results = self.search.search(&query).await?;
                serde_json::to_string_pretty(&results)?
            }
            ToolCall::RepoFileTreeStructure => self.tree.render(),
            ToolCall::RepoFileContent { file_path } => self
                .tree
                .file_content(&file_path, self.host.as_ref())
                .await
                .unwrap_or_else(|| file_not_found(&file_path)),
            ToolCall::FinalAnswer(answer) => return Ok(ToolOutcome::Answer(answer)),
        };
        Ok(ToolOutcome::Observation(text))
    }
}

impl fmt::Debug for Toolbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toolbox")
            .field("repository", &self.tree.repository())
            .finish_non_exhaustive()
    }
}

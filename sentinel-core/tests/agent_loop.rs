//! End-to-end runs of the review agent through the public API

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sentinel_core::agent::{AgentState, ReviewAgent, Termination};
use sentinel_core::llm::{ChatMessage, ChatModel};
use sentinel_core::repo::{
    ChangedFile, CodeHost, MemoryCache, RepositoryTree, TreeEntry, TreeListing,
};
use sentinel_core::tools::{SearchResult, Toolbox, WebSearch};
use sentinel_core::{Error, Result};

struct StaticHost;

#[async_trait]
impl CodeHost for StaticHost {
    fn repository(&self) -> String {
        "acme/widgets".to_string()
    }

    async fn tree_listing(&self) -> Result<TreeListing> {
        Ok(TreeListing {
            sha: "abc123".to_string(),
            entries: vec![
                TreeEntry::file("src/a.py", "blob:a", "sha-a", 12),
                TreeEntry::file("src/lib/b.py", "blob:b", "sha-b", 20),
                TreeEntry::file("README.md", "blob:readme", "sha-r", 8),
                TreeEntry::folder("src", "sha-src"),
            ],
        })
    }

    async fn blob_content(&self, blob_url: &str) -> Result<String> {
        match blob_url {
            "blob:a" => Ok("import lib.b\n".to_string()),
            "blob:b" => Ok("def helper():\n    pass\n".to_string()),
            "blob:readme" => Ok("# widgets\n".to_string()),
            other => Err(Error::Remote(format!("unknown blob {}", other))),
        }
    }

    async fn changed_files(&self, _pr_number: u64) -> Result<Vec<ChangedFile>> {
        Ok(Vec::new())
    }
}

struct DownSearch;

#[async_trait]
impl WebSearch for DownSearch {
    async fn search(&self, _query: &str) -> Result<Vec<SearchResult>> {
        Err(Error::Remote("503 Service Unavailable".to_string()))
    }
}

struct Script {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<usize>,
}

impl Script {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            calls: Mutex::new(0),
        })
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ChatModel for Script {
    fn name(&self) -> &str {
        "script"
    }

    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String> {
        *self.calls.lock().unwrap() += 1;
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Model("script exhausted".to_string()))
    }
}

async fn run(model: Arc<Script>, max_steps: usize) -> AgentState {
    let host: Arc<dyn CodeHost> = Arc::new(StaticHost);
    let tree = RepositoryTree::load(host.as_ref(), &MemoryCache::new())
        .await
        .unwrap();
    let toolbox = Toolbox::new(Arc::new(DownSearch), host, Arc::new(tree));

    ReviewAgent::new(model, toolbox, max_steps)
        .run("file_path: src/a.py\nfile_content: +import lib.b")
        .await
        .unwrap()
}

fn outputs(state: &AgentState) -> Vec<(String, String)> {
    state
        .completed_actions()
        .map(|a| (a.tool_name.clone(), a.tool_output.clone().unwrap_or_default()))
        .collect()
}

#[tokio::test]
async fn full_review_with_tools_and_advisory() {
    let model = Script::new(&[
        r#"{"name": "repo_file_tree_structure", "parameters": {}}"#,
        r#"{"name": "repo_file_content", "parameters": {"file_path": "src/lib/b.py"}}"#,
        r#"{"name": "web_search", "parameters": {"query": "python relative imports"}}"#,
        r#"{"name": "final_answer", "parameters": {
            "file": {"name": "src/a.py", "issues": [
                {"type": "style", "description": "absolute import", "line_number": 1, "suggestion": "use from . import b"}
            ]},
            "summary": {"total_files": 1, "total_issues": 1, "critical_issues": 0}
        }}"#,
    ]);

    let state = run(model.clone(), 8).await;
    assert_eq!(state.termination(), Some(Termination::Answered));
    assert_eq!(model.calls(), 4);

    let outputs = outputs(&state);
    assert_eq!(outputs[0].0, "repo_file_tree_structure");
    assert_eq!(outputs[0].1, "-README.md\n|src\n  -a.py\n  |lib\n    -b.py\n");
    assert_eq!(outputs[1].1, "def helper():\n    pass\n");
    assert!(outputs[2].1.starts_with("web_search is currently unusable"));

    let answer = state.output.unwrap();
    assert_eq!(answer.file.issues.len(), 1);
    assert_eq!(answer.file.issues[0].line_number, 1);
    assert_eq!(answer.summary.total_issues, 1);
}

#[tokio::test]
async fn missing_file_is_reported_not_raised() {
    let model = Script::new(&[
        r#"{"name": "repo_file_content", "parameters": {"file_path": "src/nope.py"}}"#,
        r#"{"name": "final_answer", "parameters": {}}"#,
    ]);

    let state = run(model, 8).await;
    let outputs = outputs(&state);
    assert!(outputs[0].1.contains("src/nope.py"));
    assert_eq!(state.termination(), Some(Termination::Answered));
}

#[tokio::test]
async fn unknown_tool_finishes_run() {
    let model = Script::new(&[r#"{"name": "run_shell", "parameters": {"cmd": "ls"}}"#]);

    let state = run(model.clone(), 8).await;
    assert!(state.is_terminal());
    assert!(state.output.is_some());
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn prose_reply_finishes_without_error() {
    let model = Script::new(&["Looks good to me!"]);

    let state = run(model, 8).await;
    assert_eq!(state.termination(), Some(Termination::Unparseable));
    assert_eq!(state.output.unwrap(), Default::default());
}

#[tokio::test]
async fn step_budget_is_enforced() {
    let tree = r#"{"name": "repo_file_tree_structure", "parameters": {}}"#;
    let model = Script::new(&[tree, tree]);

    let state = run(model.clone(), 2).await;
    assert_eq!(model.calls(), 2);
    assert_eq!(state.steps_taken(), 2);
    assert_eq!(state.termination(), Some(Termination::StepLimitExceeded));

    let last = state.intermediate_steps.last().unwrap();
    assert_eq!(last.tool_input["marker"], "step_limit_exceeded");
}

//! In-process fakes shared by unit tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::llm::{ChatMessage, ChatModel};
use crate::repo::{ChangedFile, CodeHost, RepositoryTree, TreeCache, TreeEntry, TreeListing};
use crate::tools::{SearchResult, Toolbox, WebSearch};
use crate::{Error, Result};

const BLOB_PREFIX: &str = "blob://";

/// Code host serving a fixed set of files
#[derive(Debug, Default)]
pub struct FakeHost {
    files: Vec<(String, String)>,
    changed: Vec<ChangedFile>,
    fail_listing: bool,
    fail_blobs: bool,
    listing_calls: AtomicUsize,
}

impl FakeHost {
    pub fn new(files: &[(&str, &str)]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(p, c)| (p.to_string(), c.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_changed_files(mut self, changed: Vec<ChangedFile>) -> Self {
        self.changed = changed;
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn failing_blobs(mut self) -> Self {
        self.fail_blobs = true;
        self
    }

    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    pub fn listing(&self) -> TreeListing {
        TreeListing {
            sha: "root-sha".to_string(),
            entries: self
                .files
                .iter()
                .map(|(path, content)| {
                    TreeEntry::file(
                        path.clone(),
                        format!("{}{}", BLOB_PREFIX, path),
                        format!("sha-{}", path),
                        content.len() as u64,
                    )
                })
                .collect(),
        }
    }
}

#[async_trait]
impl CodeHost for FakeHost {
    fn repository(&self) -> String {
        "owner/repo".to_string()
    }

    async fn tree_listing(&self) -> Result<TreeListing> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing {
            return Err(Error::Remote("listing unavailable".to_string()));
        }
        Ok(self.listing())
    }

    async fn blob_content(&self, blob_url: &str) -> Result<String> {
        if self.fail_blobs {
            return Err(Error::Remote("blob unavailable".to_string()));
        }
        let path = blob_url.trim_start_matches(BLOB_PREFIX);
        self.files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, c)| c.clone())
            .ok_or_else(|| Error::Remote(format!("no blob {}", blob_url)))
    }

    async fn changed_files(&self, _pr_number: u64) -> Result<Vec<ChangedFile>> {
        Ok(self.changed.clone())
    }
}

/// Search engine returning canned results, or failing
#[derive(Debug, Default)]
pub struct FakeSearch {
    results: Vec<SearchResult>,
    fail: bool,
}

impl FakeSearch {
    pub fn with_results(results: Vec<SearchResult>) -> Self {
        Self {
            results,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            results: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl WebSearch for FakeSearch {
    async fn search(&self, _query: &str) -> Result<Vec<SearchResult>> {
        if self.fail {
            return Err(Error::Remote("search engine unreachable".to_string()));
        }
        Ok(self.results.clone())
    }
}

/// Cache whose every operation fails
#[derive(Debug, Default)]
pub struct FailingCache;

#[async_trait]
impl TreeCache for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(Error::Cache("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(Error::Cache("connection refused".to_string()))
    }
}

/// Model replaying scripted replies and recording each request
#[derive(Debug, Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| Ok(r.to_string())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([Err(Error::Model(
                "connection refused".to_string(),
            ))])),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(r#"{"name":"final_answer","parameters":{}}"#.to_string()))
    }
}

/// Toolbox over a tree built from `host`'s listing
pub fn toolbox(host: FakeHost, search: FakeSearch) -> Toolbox {
    let tree = RepositoryTree::from_listing(host.repository(), &host.listing());
    Toolbox::new(Arc::new(search), Arc::new(host), Arc::new(tree))
}

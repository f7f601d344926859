//! Web search backing the `web_search` tool

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SearchConfig;
use crate::{Error, Result};

/// Engine names accepted in `[search] engine`
pub const ENGINES: &[&str] = &["duckduckgo", "google"];

const DUCKDUCKGO_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
const GOOGLE_ENDPOINT: &str = "https://www.google.com/search";
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

/// One ranked search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// A web search engine
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Return ranked results for `query`, best first
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
}

/// Build the search engine named in the configuration
pub fn from_config(config: &SearchConfig) -> Result<Arc<dyn WebSearch>> {
    match config.engine.as_str() {
        "duckduckgo" => Ok(Arc::new(DuckDuckGo::new(config.max_results)?)),
        "google" => Ok(Arc::new(Google::new(config.max_results)?)),
        other => Err(Error::Config(format!("Unsupported search engine: {}", other))),
    }
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| Error::Remote(format!("Failed to build HTTP client: {}", e)))
}

/// Scraper for DuckDuckGo's HTML results page
#[derive(Debug, Clone)]
pub struct DuckDuckGo {
    client: reqwest::Client,
    max_results: usize,
}

impl DuckDuckGo {
    pub fn new(max_results: usize) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            max_results,
        })
    }
}

#[async_trait]
impl WebSearch for DuckDuckGo {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let html = self
            .client
            .get(DUCKDUCKGO_ENDPOINT)
            .query(&[("q", query)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let results = parse_duckduckgo_results(&html, self.max_results);
        debug!(engine = "duckduckgo", query, count = results.len(), "Web search completed");
        Ok(results)
    }
}

/// Scraper for Google's results page
#[derive(Debug, Clone)]
pub struct Google {
    client: reqwest::Client,
    max_results: usize,
}

impl Google {
    pub fn new(max_results: usize) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            max_results,
        })
    }
}

#[async_trait]
impl WebSearch for Google {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let num = self.max_results.to_string();
        let html = self
            .client
            .get(GOOGLE_ENDPOINT)
            .query(&[("q", query), ("num", num.as_str())])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let results = parse_google_results(&html, self.max_results);
        debug!(engine = "google", query, count = results.len(), "Web search completed");
        Ok(results)
    }
}

static RESULT_SPLIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"class="result\s+results_links"#).expect("result split pattern is valid")
});
static TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)class="result__a"[^>]*>(.*?)</a>"#).expect("title pattern is valid")
});
static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)class="result__url"[^>]*>(.*?)</a>"#).expect("link pattern is valid")
});
static SNIPPET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)class="result__snippet"[^>]*>(.*?)</(?:a|div|td)>"#)
        .expect("snippet pattern is valid")
});
static GOOGLE_RESULT_SPLIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<div\b[^>]*\bclass="g(?:\s[^"]*)?""#).expect("google result pattern is valid")
});
static GOOGLE_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<h3\b[^>]*>(.*?)</h3>").expect("google title pattern is valid")
});
static GOOGLE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a\b[^>]*?\bhref="([^"]*)""#).expect("google link pattern is valid")
});
static GOOGLE_SNIPPET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div\b[^>]*\bclass="[^"]*\bVwiC3b\b[^"]*"[^>]*>(.*?)</div>"#)
        .expect("google snippet pattern is valid")
});
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

/// Field patterns for one engine's result blocks
struct ResultPatterns<'a> {
    split: &'a Regex,
    title: &'a Regex,
    link: &'a Regex,
    snippet: &'a Regex,
}

/// Extract up to `limit` results from a DuckDuckGo HTML page
///
/// Blocks without both a title and a link are skipped.
pub fn parse_duckduckgo_results(html: &str, limit: usize) -> Vec<SearchResult> {
    let patterns = ResultPatterns {
        split: &RESULT_SPLIT,
        title: &TITLE,
        link: &LINK,
        snippet: &SNIPPET,
    };
    parse_blocks(html, &patterns, limit)
}

/// Extract up to `limit` results from a Google results page
///
/// Each `div.g` block contributes its `h3` title, the `href` of its first
/// anchor and the `VwiC3b` snippet.
pub fn parse_google_results(html: &str, limit: usize) -> Vec<SearchResult> {
    let patterns = ResultPatterns {
        split: &GOOGLE_RESULT_SPLIT,
        title: &GOOGLE_TITLE,
        link: &GOOGLE_LINK,
        snippet: &GOOGLE_SNIPPET,
    };
    parse_blocks(html, &patterns, limit)
}

fn parse_blocks(html: &str, patterns: &ResultPatterns<'_>, limit: usize) -> Vec<SearchResult> {
    patterns
        .split
        .split(html)
        .skip(1)
        .filter_map(|block| {
            let title = capture_text(patterns.title, block)?;
            let link = capture_text(patterns.link, block)?;
            let snippet = capture_text(patterns.snippet, block).unwrap_or_default();
            Some(SearchResult {
                title,
                link,
                snippet,
            })
        })
        .take(limit)
        .collect()
}

fn capture_text(re: &Regex, block: &str) -> Option<String> {
    let raw = re.captures(block)?.get(1)?.as_str();
    let text = clean_text(raw);
    (!text.is_empty()).then_some(text)
}

fn clean_text(fragment: &str) -> String {
    let stripped = TAG.replace_all(fragment, "");
    // `&amp;` last so an escaped entity stays literal
    let decoded = stripped
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

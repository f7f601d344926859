//! Configuration management for Sentinel
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (SENTINEL_*)
//! 3. Config file (~/.config/sentinel/config.toml)
//! 4. Default values

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Agent loop and model configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Ollama model used for decisions
    pub model: String,

    /// Base URL of the Ollama server
    pub ollama_url: String,

    /// Maximum completed tool dispatches before the loop is forced to answer
    pub max_steps: usize,

    /// Context window passed to the model
    pub num_ctx: u32,

    /// Timeout for a single model request
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "llama3.1".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            max_steps: 8,
            num_ctx: 8192,
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Web search configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search engine name, one of [`search::ENGINES`](crate::tools::search::ENGINES)
    pub engine: String,

    /// Number of results returned to the model
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            engine: "duckduckgo".to_string(),
            max_results: 5,
        }
    }
}

/// Tree cache and job store configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// SQLite database path (defaults to ~/.cache/sentinel/sentinel.db)
    pub db_path: Option<PathBuf>,
}

impl CacheConfig {
    /// Resolve the database path, falling back to the cache directory
    pub fn resolved_db_path(&self) -> Option<PathBuf> {
        self.db_path.clone().or_else(|| {
            dirs::cache_dir().map(|p| p.join("sentinel").join("sentinel.db"))
        })
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Agent configuration
    pub agent: AgentConfig,

    /// Web search configuration
    pub search: SearchConfig,

    /// Cache configuration
    pub cache: CacheConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/sentinel/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sentinel").join("config.toml"))
    }

    /// Reject values the agent loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.agent.max_steps == 0 {
            return Err(Error::Config("agent.max_steps must be at least 1".to_string()));
        }
        if !crate::tools::search::ENGINES.contains(&self.search.engine.as_str()) {
            return Err(Error::Config(format!(
                "Unsupported search engine '{}'. Use one of: {}",
                self.search.engine,
                crate::tools::search::ENGINES.join(", ")
            )));
        }
        Ok(())
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - SENTINEL_MODEL: Ollama model name
    /// - SENTINEL_OLLAMA_URL: Ollama base URL
    /// - SENTINEL_MAX_STEPS: Agent step limit
    /// - SENTINEL_DB_PATH: SQLite database path
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(model) = std::env::var("SENTINEL_MODEL") {
            self.agent.model = model;
        }

        if let Ok(url) = std::env::var("SENTINEL_OLLAMA_URL") {
            self.agent.ollama_url = url;
        }

        if let Ok(steps) = std::env::var("SENTINEL_MAX_STEPS") {
            self.agent.max_steps = steps.trim().parse().map_err(|_| {
                Error::Config(format!("SENTINEL_MAX_STEPS is not a number: {}", steps))
            })?;
        }

        if let Ok(path) = std::env::var("SENTINEL_DB_PATH") {
            self.cache.db_path = Some(PathBuf::from(path));
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(
        mut self,
        model: Option<String>,
        ollama_url: Option<String>,
        max_steps: Option<usize>,
    ) -> Self {
        if let Some(m) = model {
            self.agent.model = m;
        }

        if let Some(url) = ollama_url {
            self.agent.ollama_url = url;
        }

        if let Some(steps) = max_steps {
            self.agent.max_steps = steps;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        model: Option<String>,
        ollama_url: Option<String>,
        max_steps: Option<usize>,
    ) -> Result<Self> {
        let config = Self::load()?
            .with_env_overrides()?
            .with_cli_overrides(model, ollama_url, max_steps);
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.agent.model, "llama3.1");
        assert_eq!(config.agent.max_steps, 8);
        assert_eq!(config.agent.request_timeout, Duration::from_secs(120));
        assert_eq!(config.search.max_results, 5);
        assert!(config.cache.db_path.is_none());
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default().with_cli_overrides(
            Some("qwen3".to_string()),
            Some("http://gpu-box:11434".to_string()),
            Some(3),
        );

        assert_eq!(config.agent.model, "qwen3");
        assert_eq!(config.agent.ollama_url, "http://gpu-box:11434");
        assert_eq!(config.agent.max_steps, 3);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[agent]
model = "codellama"
max_steps = 4
request_timeout = "30s"

[search]
max_results = 3

[cache]
db_path = "/tmp/sentinel.db"
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.agent.model, "codellama");
        assert_eq!(config.agent.max_steps, 4);
        assert_eq!(config.agent.request_timeout, Duration::from_secs(30));
        assert_eq!(config.search.max_results, 3);
        assert_eq!(config.cache.db_path, Some(PathBuf::from("/tmp/sentinel.db")));
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[agent]
model = "qwen3"
"#;
        let config = Config::from_toml(toml).unwrap();
        // unspecified fields keep their defaults
        assert_eq!(config.agent.ollama_url, "http://localhost:11434");
        assert_eq!(config.agent.max_steps, 8);
        assert_eq!(config.agent.model, "qwen3");
    }

    #[test]
    fn test_zero_step_limit_rejected() {
        let toml = r#"
[agent]
max_steps = 0
"#;
        let err = Config::from_toml(toml).unwrap_err();
        assert!(err.to_string().contains("max_steps"));
    }

    #[test]
    fn test_unknown_search_engine_rejected() {
        let toml = r#"
[search]
engine = "altavista"
"#;
        assert!(Config::from_toml(toml).is_err());
    }

    #[test]
    fn test_google_search_engine_accepted() {
        let toml = r#"
[search]
engine = "google"
max_results = 3
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.search.engine, "google");
        assert_eq!(config.search.max_results, 3);
    }

    #[test]
    fn test_explicit_db_path_wins() {
        let cache = CacheConfig {
            db_path: Some(PathBuf::from("/var/lib/sentinel.db")),
        };
        assert_eq!(
            cache.resolved_db_path(),
            Some(PathBuf::from("/var/lib/sentinel.db"))
        );
    }
}

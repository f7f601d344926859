//! Ollama `/api/chat` client in JSON mode

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{ChatMessage, ChatModel};
use crate::config::AgentConfig;
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
    #[serde(default)]
    eval_count: u32,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

/// Client for Ollama's chat endpoint
///
/// Requests are sent non-streaming with `format: "json"` so the model is
/// constrained to emit a single JSON document per turn.
#[derive(Clone)]
pub struct OllamaChat {
    base_url: String,
    model: String,
    num_ctx: u32,
    client: reqwest::Client,
}

impl OllamaChat {
    /// Create a client from the agent configuration
    pub fn new(config: &AgentConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Model(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.ollama_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            num_ctx: config.num_ctx,
            client,
        })
    }

    fn request_body(&self, messages: &[ChatMessage]) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
            "format": "json",
            "options": {
                "temperature": 0.0,
                "num_ctx": self.num_ctx
            }
        })
    }
}

#[async_trait]
impl ChatModel for OllamaChat {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let endpoint = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&endpoint)
            .json(&self.request_body(messages))
            .send()
            .await
            .map_err(|e| Error::Model(format!("Request to {} failed: {}", endpoint, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Model(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Model(format!("Ollama returned {}: {}", status, text)));
        }
        if text.is_empty() {
            return Err(Error::Model("Empty response from Ollama".to_string()));
        }

        let chat: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| Error::Model(format!("Unexpected Ollama response: {}", e)))?;

        debug!(
            model = %self.model,
            eval_count = chat.eval_count,
            "Model call completed"
        );

        Ok(chat.message.content)
    }
}

impl std::fmt::Debug for OllamaChat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaChat")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_uses_json_mode() {
        let config = AgentConfig {
            model: "codellama".to_string(),
            num_ctx: 2048,
            ..AgentConfig::default()
        };
        let client = OllamaChat::new(&config).unwrap();
        let body = client.request_body(&[ChatMessage::user("hi")]);

        assert_eq!(body["model"], "codellama");
        assert_eq!(body["format"], "json");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["num_ctx"], 2048);
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = AgentConfig {
            ollama_url: "http://localhost:11434/".to_string(),
            ..AgentConfig::default()
        };
        let client = OllamaChat::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{"model":"llama3.1","message":{"role":"assistant","content":"{\"name\":\"final_answer\",\"parameters\":{}}"},"done":true,"eval_count":12}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.message.content.contains("final_answer"));
        assert_eq!(parsed.eval_count, 12);
    }
}

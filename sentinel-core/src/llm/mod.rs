//! Language model access
//!
//! The agent loop only needs one capability from a model: given a message
//! list, return the assistant's raw text. [`ChatModel`] captures that; the
//! Ollama client is the production implementation.

mod ollama;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

pub use ollama::OllamaChat;

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A message in a chat conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A model that produces the next assistant message for a conversation
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier, for logging
    fn name(&self) -> &str;

    /// Return the raw assistant content for `messages`
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_roles() {
        assert_eq!(ChatMessage::system("s").role, Role::System);
        assert_eq!(ChatMessage::user("u").role, Role::User);
        assert_eq!(ChatMessage::assistant("a").role, Role::Assistant);
    }

    #[test]
    fn test_message_serialization() {
        let json = serde_json::to_string(&ChatMessage::user("test message")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"test message"}"#);
    }
}

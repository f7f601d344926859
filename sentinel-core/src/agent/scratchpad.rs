//! Completed actions rendered as conversation turns

use super::action::AgentAction;
use crate::llm::ChatMessage;

/// Turn completed actions into assistant/user message pairs
///
/// Each action becomes the assistant's `{"name","parameters"}` decision
/// followed by the tool output as a user message. When anything was
/// recorded, a closing reminder restates the input and names the tools
/// already used.
pub fn build(input: &str, steps: &[AgentAction]) -> Vec<ChatMessage> {
    let completed: Vec<&AgentAction> = steps.iter().filter(|a| a.is_completed()).collect();
    if completed.is_empty() {
        return Vec::new();
    }

    let mut messages = Vec::with_capacity(completed.len() * 2 + 1);
    let mut used: Vec<&str> = Vec::new();
    for action in &completed {
        let decision = serde_json::json!({
            "name": action.tool_name,
            "parameters": action.tool_input,
        });
        messages.push(ChatMessage::assistant(decision.to_string()));
        messages.push(ChatMessage::user(
            action.tool_output.clone().unwrap_or_default(),
        ));

        if !used.contains(&action.tool_name.as_str()) {
            used.push(&action.tool_name);
        }
    }

    messages.push(ChatMessage::user(reminder(input, &used)));
    messages
}

fn reminder(input: &str, used: &[&str]) -> String {
    format!(
        "Please continue. As a reminder, my query was:\n{}\n\n\
         Only answer the original query, using the information above. \
         Tools already used, do not call them again: {}",
        input,
        used.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;
    use serde_json::{json, Value};

    #[test]
    fn test_empty_steps_give_empty_scratchpad() {
        assert!(build("input", &[]).is_empty());
        assert!(build("input", &[AgentAction::pending("web_search", json!({}))]).is_empty());
    }

    #[test]
    fn test_pairs_in_order_with_reminder() {
        let steps = vec![
            AgentAction::pending("web_search", json!({"query": "q"})),
            AgentAction::completed("web_search", json!({"query": "q"}), "[]".into()),
            AgentAction::completed("repo_file_tree_structure", json!({}), "-a.rs\n".into()),
            AgentAction::completed("web_search", json!({"query": "r"}), "[1]".into()),
        ];

        let messages = build("file_path: a.rs", &steps);
        assert_eq!(messages.len(), 7);

        assert_eq!(messages[0].role, Role::Assistant);
        let decision: Value = serde_json::from_str(&messages[0].content).unwrap();
        assert_eq!(decision, json!({"name": "web_search", "parameters": {"query": "q"}}));
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "[]");
        assert_eq!(messages[3].content, "-a.rs\n");

        let reminder = &messages[6];
        assert_eq!(reminder.role, Role::User);
        assert!(reminder.content.contains("file_path: a.rs"));
        assert!(reminder
            .content
            .ends_with("do not call them again: web_search, repo_file_tree_structure"));
    }
}

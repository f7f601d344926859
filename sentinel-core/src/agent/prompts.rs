//! Prompt text for the review agent

use crate::tools::render_tool_list;

const SYSTEM_PROMPT: &str = include_str!("prompts/system.md");

/// Task description followed by the tool list
pub fn system_instruction() -> String {
    format!(
        "{}\nYou can strictly only use the following tools:\n\n{}",
        SYSTEM_PROMPT,
        render_tool_list()
    )
}

/// Agent input for one changed file
///
/// Newlines in the path and patch are flattened to spaces so each field
/// stays on its own line.
pub fn file_input(file_path: &str, patch: &str) -> String {
    format!(
        "file_path: {}\nfile_content: {}",
        file_path.replace('\n', " "),
        patch.replace('\n', " ")
    )
}

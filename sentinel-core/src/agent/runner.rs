//! Drives an [`AgentState`] with a model and a toolbox

use std::sync::Arc;

use tracing::{debug, info_span, Instrument};

use super::action::Decision;
use super::prompts::system_instruction;
use super::scratchpad;
use super::state::AgentState;
use crate::llm::{ChatMessage, ChatModel};
use crate::tools::Toolbox;
use crate::Result;

/// Review agent: decide, dispatch, record until a final answer
pub struct ReviewAgent {
    model: Arc<dyn ChatModel>,
    toolbox: Toolbox,
    max_steps: usize,
    system: String,
}

impl ReviewAgent {
    pub fn new(model: Arc<dyn ChatModel>, toolbox: Toolbox, max_steps: usize) -> Self {
        Self {
            model,
            toolbox,
            max_steps,
            system: system_instruction(),
        }
    }

    pub fn toolbox(&self) -> &Toolbox {
        &self.toolbox
    }

    /// Run the loop over `input` and return the terminal state
    ///
    /// Tool failures and malformed decisions are absorbed by the loop; only
    /// a failed model call ends the run with an error.
    pub async fn run(&self, input: &str) -> Result<AgentState> {
        let span = info_span!(
            "agent_run",
            model = self.model.name(),
            max_steps = self.max_steps
        );

        async {
            let mut state = AgentState::new(input, self.max_steps);
            while !state.is_terminal() {
                let decision = match state.forced_decision() {
                    Some(forced) => forced,
                    None => {
                        let reply = self.model.complete(&self.messages(&state)).await?;
                        Decision::parse(&reply)
                    }
                };

                let tool = state.decide(decision)?;
                let parameters = state
                    .pending_action()
                    .map(|a| a.tool_input.clone())
                    .unwrap_or_default();

                let outcome = self.toolbox.dispatch(tool, &parameters).await;
                state.record(outcome)?;
            }
            debug!(actions = state.intermediate_steps.len(), "Agent loop exited");
            Ok::<_, crate::Error>(state)
        }
        .instrument(span)
        .await
    }

    /// `[system, ...chat_history, user(input), ...scratchpad]`
    fn messages(&self, state: &AgentState) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(state.chat_history.len() + 2);
        messages.push(ChatMessage::system(self.system.clone()));
        messages.extend(state.chat_history.iter().cloned());
        messages.push(ChatMessage::user(state.input.clone()));
        messages.extend(scratchpad::build(&state.input, &state.intermediate_steps));
        messages
    }
}

impl std::fmt::Debug for ReviewAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewAgent")
            .field("model", &self.model.name())
            .field("max_steps", &self.max_steps)
            .finish_non_exhaustive()
    }
}

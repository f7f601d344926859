//! Per-run agent state machine
//!
//! ```text
//! Deciding --decide--> Dispatching(tool) --record(observation)--> Deciding
//!                                        --record(answer)-------> Terminal
//! ```
//!
//! The transitions are plain methods with no I/O; the runner feeds them
//! model decisions and tool outcomes.

use std::fmt;

use tracing::{debug, info, warn};

use super::action::{AgentAction, Decision, DecisionSource};
use crate::llm::ChatMessage;
use crate::review::FinalAnswer;
use crate::tools::{ToolName, ToolOutcome};
use crate::{Error, Result};

/// Loop phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Deciding,
    Dispatching(ToolName),
    Terminal,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Deciding => write!(f, "deciding"),
            Phase::Dispatching(tool) => write!(f, "dispatching({})", tool),
            Phase::Terminal => write!(f, "terminal"),
        }
    }
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The model called the final-answer tool
    Answered,
    /// The model's reply could not be parsed as a decision
    Unparseable,
    /// The step budget ran out
    StepLimitExceeded,
}

/// State of one agent run over one input
#[derive(Debug, Clone)]
pub struct AgentState {
    pub input: String,
    pub chat_history: Vec<ChatMessage>,
    pub intermediate_steps: Vec<AgentAction>,
    pub output: Option<FinalAnswer>,
    phase: Phase,
    max_steps: usize,
    pending_source: DecisionSource,
    termination: Option<Termination>,
}

impl AgentState {
    pub fn new(input: impl Into<String>, max_steps: usize) -> Self {
        Self {
            input: input.into(),
            chat_history: Vec::new(),
            intermediate_steps: Vec::new(),
            output: None,
            phase: Phase::Deciding,
            max_steps,
            pending_source: DecisionSource::Model,
            termination: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == Phase::Terminal
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Completed dispatches of tools other than final answer
    pub fn steps_taken(&self) -> usize {
        self.completed_actions()
            .filter(|a| a.tool_name != ToolName::FinalAnswer.as_str())
            .count()
    }

    pub fn completed_actions(&self) -> impl Iterator<Item = &AgentAction> {
        self.intermediate_steps.iter().filter(|a| a.is_completed())
    }

    /// Decision to apply without consulting the model, if the budget is spent
    pub fn forced_decision(&self) -> Option<Decision> {
        (self.phase == Phase::Deciding && self.steps_taken() >= self.max_steps)
            .then(Decision::step_limit)
    }

    /// The most recently decided action that has not yet run
    pub fn pending_action(&self) -> Option<&AgentAction> {
        match self.phase {
            Phase::Dispatching(_) => self.intermediate_steps.last(),
            _ => None,
        }
    }

    /// Apply a decision and return the tool to dispatch
    ///
    /// Names outside the registry route to the final answer.
    pub fn decide(&mut self, decision: Decision) -> Result<ToolName> {
        if self.phase != Phase::Deciding {
            return Err(Error::Agent(format!(
                "cannot decide while {}",
                self.phase
            )));
        }

        let tool = decision.name.parse::<ToolName>().unwrap_or_else(|e| {
            warn!(error = %e, "Model chose an unregistered tool, routing to final answer");
            ToolName::FinalAnswer
        });

        debug!(
            tool = %tool,
            requested = %decision.name,
            step = self.steps_taken() + 1,
            "Decided next action"
        );

        self.intermediate_steps
            .push(AgentAction::pending(decision.name, decision.parameters));
        self.pending_source = decision.source;
        self.phase = Phase::Dispatching(tool);
        Ok(tool)
    }

    /// Record the outcome of the pending dispatch
    pub fn record(&mut self, outcome: ToolOutcome) -> Result<()> {
        let Phase::Dispatching(tool) = self.phase else {
            return Err(Error::Agent(format!(
                "cannot record an outcome while {}",
                self.phase
            )));
        };

        let input = self
            .intermediate_steps
            .last()
            .map(|a| a.tool_input.clone())
            .unwrap_or_default();

        match outcome {
            ToolOutcome::Observation(text) => {
                if tool == ToolName::FinalAnswer {
                    return Err(Error::Agent(
                        "final answer dispatch produced an observation".to_string(),
                    ));
                }
                self.intermediate_steps
                    .push(AgentAction::completed(tool.as_str(), input, text));
                self.phase = Phase::Deciding;
            }
            ToolOutcome::Answer(answer) => {
                let serialized = serde_json::to_string(&answer)?;
                self.intermediate_steps
                    .push(AgentAction::completed(tool.as_str(), input, serialized));
                self.output = Some(answer);
                self.phase = Phase::Terminal;

                let termination = match self.pending_source {
                    DecisionSource::Model => Termination::Answered,
                    DecisionSource::Unparseable => Termination::Unparseable,
                    DecisionSource::StepLimit => Termination::StepLimitExceeded,
                };
                self.termination = Some(termination);
                info!(
                    steps = self.steps_taken(),
                    termination = ?termination,
                    "Agent run finished"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn observe(state: &mut AgentState, text: &str) {
        state
            .record(ToolOutcome::Observation(text.to_string()))
            .unwrap();
    }

    #[test]
    fn test_final_answer_terminates_in_one_step() {
        let mut state = AgentState::new("input", 8);
        let tool = state
            .decide(Decision::new(
                "final_answer",
                json!({"file": {"name": "a.rs"}}),
            ))
            .unwrap();
        assert_eq!(tool, ToolName::FinalAnswer);
        assert!(state.output.is_none());

        let answer = FinalAnswer::from_parameters(&json!({"file": {"name": "a.rs"}}));
        state.record(ToolOutcome::Answer(answer.clone())).unwrap();

        assert!(state.is_terminal());
        assert_eq!(state.output, Some(answer));
        assert_eq!(state.termination(), Some(Termination::Answered));
        assert_eq!(state.intermediate_steps.len(), 2);
    }

    #[test]
    fn test_observation_returns_to_deciding() {
        let mut state = AgentState::new("input", 8);
        state
            .decide(Decision::new("web_search", json!({"query": "q"})))
            .unwrap();
        assert_eq!(state.phase(), Phase::Dispatching(ToolName::WebSearch));
        assert_eq!(state.pending_action().unwrap().tool_output, None);

        observe(&mut state, "[]");
        assert_eq!(state.phase(), Phase::Deciding);
        assert_eq!(state.steps_taken(), 1);

        let completed: Vec<_> = state.completed_actions().collect();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].tool_name, "web_search");
        assert_eq!(completed[0].tool_input, json!({"query": "q"}));
        assert_eq!(completed[0].tool_output.as_deref(), Some("[]"));
    }

    #[test]
    fn test_unknown_tool_routes_to_final_answer() {
        let mut state = AgentState::new("input", 8);
        let tool = state
            .decide(Decision::new("delete_repository", json!({})))
            .unwrap();
        assert_eq!(tool, ToolName::FinalAnswer);
        assert_eq!(state.pending_action().unwrap().tool_name, "delete_repository");
    }

    #[test]
    fn test_step_limit_forces_final_answer() {
        let mut state = AgentState::new("input", 2);
        for _ in 0..2 {
            assert!(state.forced_decision().is_none());
            state
                .decide(Decision::new("repo_file_tree_structure", json!({})))
                .unwrap();
            observe(&mut state, "-a.rs\n");
        }

        let forced = state.forced_decision().unwrap();
        assert_eq!(forced.parameters["marker"], "step_limit_exceeded");
        state.decide(forced).unwrap();
        state
            .record(ToolOutcome::Answer(FinalAnswer::default()))
            .unwrap();

        assert_eq!(state.termination(), Some(Termination::StepLimitExceeded));
        assert_eq!(state.steps_taken(), 2);
    }

    #[test]
    fn test_unparseable_decision_termination() {
        let mut state = AgentState::new("input", 8);
        state.decide(Decision::parse("not json")).unwrap();
        state
            .record(ToolOutcome::Answer(FinalAnswer::default()))
            .unwrap();
        assert_eq!(state.termination(), Some(Termination::Unparseable));
    }

    #[test]
    fn test_out_of_order_transitions_rejected() {
        let mut state = AgentState::new("input", 8);
        assert!(state
            .record(ToolOutcome::Observation("x".to_string()))
            .is_err());

        state
            .decide(Decision::new("web_search", json!({"query": "q"})))
            .unwrap();
        assert!(state.decide(Decision::new("web_search", json!({}))).is_err());
    }

    #[test]
    fn test_completed_actions_are_append_only() {
        let mut state = AgentState::new("input", 8);
        state
            .decide(Decision::new("web_search", json!({"query": "a"})))
            .unwrap();
        observe(&mut state, "first");
        let snapshot = state.intermediate_steps.clone();

        state
            .decide(Decision::new("web_search", json!({"query": "b"})))
            .unwrap();
        observe(&mut state, "second");

        assert_eq!(&state.intermediate_steps[..snapshot.len()], &snapshot[..]);
        assert_eq!(state.intermediate_steps.len(), 4);
    }
}

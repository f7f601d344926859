//! Actions and model decisions

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::tools::ToolName;

/// Input key carried by the synthetic final answer issued at the step limit
pub const STEP_LIMIT_MARKER_KEY: &str = "marker";
pub const STEP_LIMIT_MARKER: &str = "step_limit_exceeded";

/// One decided, and possibly executed, tool invocation
///
/// An action without `tool_output` is pending; once the tool has run, a new
/// action carrying the output is appended after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAction {
    pub tool_name: String,
    pub tool_input: Value,
    pub tool_output: Option<String>,
}

impl AgentAction {
    pub fn pending(tool_name: impl Into<String>, tool_input: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            tool_input,
            tool_output: None,
        }
    }

    pub fn completed(tool_name: impl Into<String>, tool_input: Value, output: String) -> Self {
        Self {
            tool_name: tool_name.into(),
            tool_input,
            tool_output: Some(output),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.tool_output.is_some()
    }
}

/// Where a decision came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecisionSource {
    /// Parsed from the model's reply
    #[default]
    Model,
    /// Substituted because the reply was not a valid decision
    Unparseable,
    /// Forced because the step budget ran out
    StepLimit,
}

/// The model's choice of the next tool
///
/// The reply must be a single JSON object with exactly the keys `name` and
/// `parameters`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Decision {
    pub name: String,
    pub parameters: Value,
    #[serde(skip)]
    pub source: DecisionSource,
}

impl Decision {
    /// Parse a model reply, substituting an empty final answer on failure
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Decision>(raw.trim()) {
            Ok(decision) => decision,
            Err(e) => {
                warn!(error = %e, reply = raw, "Unparseable model decision, finishing run");
                Self {
                    name: ToolName::FinalAnswer.as_str().to_string(),
                    parameters: Value::Object(Default::default()),
                    source: DecisionSource::Unparseable,
                }
            }
        }
    }

    /// Final answer forced when the step budget is exhausted
    pub fn step_limit() -> Self {
        Self {
            name: ToolName::FinalAnswer.as_str().to_string(),
            parameters: serde_json::json!({ STEP_LIMIT_MARKER_KEY: STEP_LIMIT_MARKER }),
            source: DecisionSource::StepLimit,
        }
    }

    /// Build a decision as if the model had replied with it
    pub fn new(name: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            parameters,
            source: DecisionSource::Model,
        }
    }
}

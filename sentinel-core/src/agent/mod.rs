//! Review agent loop
//!
//! Each run starts from a fresh [`AgentState`] and alternates between asking
//! the model for a [`Decision`] and dispatching the chosen tool until the
//! final-answer tool is called or the step budget runs out.

mod action;
pub mod prompts;
mod runner;
pub mod scratchpad;
mod state;

pub use action::{AgentAction, Decision, DecisionSource, STEP_LIMIT_MARKER, STEP_LIMIT_MARKER_KEY};
pub use runner::ReviewAgent;
pub use state::{AgentState, Phase, Termination};

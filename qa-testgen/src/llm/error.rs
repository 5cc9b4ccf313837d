//! LLM error types.

use thiserror::Error;

/// Errors raised while building a model or generating text.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Model could not be built from config or environment.
    #[error("Model error: {0}")]
    Model(#[from] serdes_ai_models::ModelError),

    /// Agent run error.
    #[error("Agent run error: {0}")]
    AgentRun(#[from] serdes_ai::agent::AgentRunError),

    /// The model answered with nothing usable.
    #[error("Model returned an empty response")]
    EmptyResponse,
}

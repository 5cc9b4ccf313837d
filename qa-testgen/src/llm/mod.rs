//! Text generation through serdes-ai.

mod config;
mod error;

pub use config::LlmConfig;
pub use error::LlmError;

use async_trait::async_trait;
use serdes_ai::agent::{Agent, AgentBuilder};
use serdes_ai_models::Model;
use std::sync::Arc;
use tracing::{debug, info};

const MODEL_ENV: &str = "QA_TESTGEN_LLM_MODEL";
const TEMPERATURE_ENV: &str = "QA_TESTGEN_LLM_TEMPERATURE";
const DEFAULT_MODEL: &str = "anthropic:claude-3-5-sonnet-20241022";
const MAX_OUTPUT_TOKENS: u64 = 4000;

const SYSTEM_PROMPT: &str =
    "You are a meticulous QA engineer. Answer with markdown test cases only.";

/// Produces text for a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// [`TextGenerator`] backed by a serdes-ai agent.
pub struct LlmGenerator {
    agent: Agent<(), String>,
    model_spec: String,
}

impl LlmGenerator {
    /// Builds the generator from `[llm]` config, or from the environment
    /// when no config is given.
    ///
    /// The model comes from the config, else `QA_TESTGEN_LLM_MODEL`, else
    /// the built-in default. `QA_TESTGEN_LLM_TEMPERATURE` overrides the
    /// configured temperature.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] if the model or agent cannot be built.
    pub fn new(config: Option<&LlmConfig>) -> Result<Self, LlmError> {
        let (model, model_spec) = resolve_model(config)?;
        let temperature = resolve_temperature(config);

        let mut builder = AgentBuilder::from_arc(model)
            .system_prompt(SYSTEM_PROMPT)
            .max_tokens(MAX_OUTPUT_TOKENS);
        if let Some(temp) = temperature {
            builder = builder.temperature(temp);
        }

        info!(model = %model_spec, temperature = ?temperature, "LLM generator ready");
        Ok(Self {
            agent: builder.build(),
            model_spec,
        })
    }

    /// Returns the provider-qualified model name in use.
    #[must_use]
    pub fn model_spec(&self) -> &str {
        &self.model_spec
    }
}

#[async_trait]
impl TextGenerator for LlmGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        debug!(prompt_chars = prompt.chars().count(), "Requesting generation");
        let result = self.agent.run(prompt.to_string(), ()).await?;

        let text = result.output.trim().to_string();
        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        info!(chars = text.chars().count(), "Generation complete");
        Ok(text)
    }
}

/// Resolves the model from config or environment.
fn resolve_model(config: Option<&LlmConfig>) -> Result<(Arc<dyn Model>, String), LlmError> {
    if let Some(config) = config {
        return Ok((config.build_model()?, config.model_spec()));
    }
    let spec = model_spec_from_env();
    let model = serdes_ai_models::infer_model(&spec).map_err(LlmError::Model)?;
    Ok((model, spec))
}

fn model_spec_from_env() -> String {
    std::env::var(MODEL_ENV)
        .ok()
        .filter(|spec| !spec.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

/// Validates that a temperature value is finite and within 0.0-2.0.
fn validate_temperature(value: f64, source: &str) -> Option<f64> {
    if !value.is_finite() || !(0.0..=2.0).contains(&value) {
        tracing::warn!(
            "Invalid temperature {value} from {source}: must be finite and in range 0.0-2.0"
        );
        return None;
    }
    Some(value)
}

/// Resolves the temperature from environment or config.
///
/// Environment variable takes precedence over config file.
fn resolve_temperature(config: Option<&LlmConfig>) -> Option<f64> {
    if let Ok(val) = std::env::var(TEMPERATURE_ENV) {
        if let Ok(temp) = val.parse::<f64>() {
            return validate_temperature(temp, "environment variable");
        }
    }
    config
        .and_then(LlmConfig::temperature)
        .and_then(|t| validate_temperature(t, "config file"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn openai_config(temperature: Option<f64>) -> LlmConfig {
        LlmConfig::OpenAi {
            model: "gpt-4o".to_string(),
            api_key: None,
            base_url: None,
            timeout_secs: None,
            temperature,
        }
    }

    #[test]
    fn model_spec_defaults_without_env() {
        temp_env::with_var_unset(MODEL_ENV, || {
            assert_eq!(model_spec_from_env(), DEFAULT_MODEL);
        });
    }

    #[test]
    fn model_spec_reads_env() {
        temp_env::with_var(MODEL_ENV, Some("openai:gpt-4o"), || {
            assert_eq!(model_spec_from_env(), "openai:gpt-4o");
        });
    }

    #[test]
    fn resolve_temperature_returns_none_without_config_or_env() {
        temp_env::with_var_unset(TEMPERATURE_ENV, || {
            assert_eq!(resolve_temperature(None), None);
        });
    }

    #[test]
    fn resolve_temperature_uses_config_value() {
        temp_env::with_var_unset(TEMPERATURE_ENV, || {
            assert_eq!(resolve_temperature(Some(&openai_config(Some(0.3)))), Some(0.3));
        });
    }

    #[test]
    fn resolve_temperature_prefers_env_over_config() {
        temp_env::with_var(TEMPERATURE_ENV, Some("0.8"), || {
            assert_eq!(resolve_temperature(Some(&openai_config(Some(0.3)))), Some(0.8));
        });
    }

    #[test]
    fn resolve_temperature_rejects_out_of_range() {
        temp_env::with_var(TEMPERATURE_ENV, Some("3.5"), || {
            assert_eq!(resolve_temperature(Some(&openai_config(Some(0.3)))), None);
        });
        temp_env::with_var_unset(TEMPERATURE_ENV, || {
            assert_eq!(resolve_temperature(Some(&openai_config(Some(-1.0)))), None);
        });
    }
}

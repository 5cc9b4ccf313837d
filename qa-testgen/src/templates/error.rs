//! Prompt template error types.

use thiserror::Error;

/// Errors raised while preparing or rendering the generation prompt.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The prompt template failed to render for a ticket.
    #[error("Failed to render prompt: {0}")]
    Render(#[from] handlebars::RenderError),

    /// The prompt template has invalid syntax.
    #[error("Invalid prompt template: {0}")]
    Syntax(#[from] handlebars::TemplateError),
}

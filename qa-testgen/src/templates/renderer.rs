//! Prompt renderer.

use super::TemplateError;
use crate::config::QaEnvironment;
use crate::context::AggregatedContext;
use handlebars::{no_escape, Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use serde_json::{json, Value};

/// Built-in generation prompt.
pub const DEFAULT_PROMPT_TEMPLATE: &str = include_str!("prompt.hbs");

/// Creates a configured Handlebars registry with custom helpers.
///
/// The registry is configured with:
/// - No HTML escaping (context text is passed through verbatim)
/// - Strict mode (catches missing variables)
/// - `eq` helper for equality comparisons
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(no_escape);
    hbs.set_strict_mode(true);
    hbs.register_helper("eq", Box::new(eq_helper));
    hbs
}

/// Helper function for equality comparison in templates.
///
/// Usage: `{{#if (eq label "Frontend")}}...{{/if}}`
fn eq_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param1 = h.param(0).and_then(|v| v.value().as_str());
    let param2 = h.param(1).and_then(|v| v.value().as_str());

    let result = match (param1, param2) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };

    out.write(if result { "true" } else { "" })?;
    Ok(())
}

const PROMPT_TEMPLATE_NAME: &str = "prompt";

/// Renders the generation prompt.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Creates a renderer using [`DEFAULT_PROMPT_TEMPLATE`].
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Syntax`] if the built-in template fails to compile.
    pub fn new() -> Result<Self, TemplateError> {
        Self::with_template(DEFAULT_PROMPT_TEMPLATE)
    }

    /// Creates a renderer using a custom template.
    ///
    /// The template sees `ticket_key`, `context`, `environments` (name, url)
    /// and `repositories` (repository, name, url, label).
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Syntax`] if the template fails to compile.
    pub fn with_template(template: &str) -> Result<Self, TemplateError> {
        let mut handlebars = create_handlebars_registry();
        handlebars.register_template_string(PROMPT_TEMPLATE_NAME, template)?;
        Ok(Self { handlebars })
    }

    /// Renders the prompt for one ticket.
    ///
    /// # Arguments
    ///
    /// * `ticket_key` - Key of the ticket being processed
    /// * `context` - Assembled context for the ticket
    /// * `environments` - QA environments and the repositories they host
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Render`] if a variable is missing or a helper fails.
    pub fn render_prompt(
        &self,
        ticket_key: &str,
        context: &AggregatedContext,
        environments: &[QaEnvironment],
    ) -> Result<String, TemplateError> {
        let data = json!({
            "ticket_key": ticket_key,
            "context": context.text(),
            "environments": environments
                .iter()
                .map(|env| json!({ "name": env.name, "url": env.url }))
                .collect::<Vec<Value>>(),
            "repositories": repository_rows(environments),
        });

        Ok(self.handlebars.render(PROMPT_TEMPLATE_NAME, &data)?)
    }
}

/// One row per repository, flattened so templates need no parent lookups.
fn repository_rows(environments: &[QaEnvironment]) -> Vec<Value> {
    environments
        .iter()
        .flat_map(|env| {
            env.repositories.iter().map(move |repository| {
                json!({
                    "repository": repository,
                    "name": env.name,
                    "url": env.url,
                    "label": env.label.clone().unwrap_or_default(),
                })
            })
        })
        .collect()
}

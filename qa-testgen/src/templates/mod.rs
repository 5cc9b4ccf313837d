//! Generation prompt rendering using Handlebars.
//!
//! The prompt wraps the aggregated ticket context together with the QA
//! environment mapping from `config.toml`.

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::{create_handlebars_registry, TemplateRenderer, DEFAULT_PROMPT_TEMPLATE};

//! Runner error types.

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A required credential was not supplied.
    #[error("Missing required credential: {name}")]
    MissingCredential { name: &'static str },

    /// A configured URL could not be parsed.
    #[error("Invalid {name} '{value}': {source}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    /// Configuration file errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Prompt template errors.
    #[error(transparent)]
    Template(#[from] crate::templates::TemplateError),

    /// Issue tracker errors.
    #[error(transparent)]
    Tracker(#[from] crate::tracker::TrackerError),

    /// Source-control client initialization errors.
    #[error(transparent)]
    Scm(#[from] crate::scm::ScmError),

    /// Wiki client initialization errors.
    #[error(transparent)]
    Wiki(#[from] crate::wiki::WikiError),

    /// Model setup errors.
    #[error(transparent)]
    Llm(#[from] crate::llm::LlmError),

    /// Snapshot could not be written.
    #[error("Failed to write snapshot '{path}': {source}")]
    Snapshot {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot could not be serialized.
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

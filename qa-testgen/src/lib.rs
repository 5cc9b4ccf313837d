#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod adf;
pub mod config;
pub mod context;
pub mod fields;
pub mod llm;
pub mod runner;
pub mod scm;
pub mod summary;
pub mod templates;
pub mod tracker;
pub mod wiki;

pub use adf::{extract_text, markdown_to_document, Node, NO_CONTENT};
pub use config::{load_config, AppConfig, ConfigError, QaEnvironment};
pub use context::{
    assemble, gather, AggregatedContext, ContextLimits, EnrichmentOptions, Sources,
    TicketEnrichment,
};
pub use fields::{resolve_fields, FieldOverrides, FieldTarget, ResolvedFields};
pub use llm::{LlmConfig, LlmError, LlmGenerator, TextGenerator};
pub use runner::{Pipeline, ProcessedTicket, Runner, RunnerConfig, RunnerError};
pub use scm::{
    select_pull_requests, CodeChangeSummary, FileChange, GitHubClient, PullRequestRef,
    PullRequestSource, PullRequestState, ScmError,
};
pub use summary::{ProcessingResult, RunSummary};
pub use templates::{create_handlebars_registry, TemplateError, TemplateRenderer};
pub use tracker::{JiraClient, Ticket, TicketSource, TrackerError};
pub use wiki::{ConfluenceClient, WikiError, WikiMention, WikiPage, WikiSource};

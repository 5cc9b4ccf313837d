//! Orchestrates a ticket query, context gathering and test case write-back.

mod config;
mod error;
mod pipeline;
mod snapshot;

pub use config::{RunnerConfig, DEFAULT_CONFIG_PATH, DEFAULT_OUTPUT_PATH};
pub use error::RunnerError;
pub use pipeline::Pipeline;
pub use snapshot::{write_snapshot, ProcessedTicket};

use crate::config::{load_config, AppConfig};
use crate::context::Sources;
use crate::fields::{resolve_fields, FieldPrompt, NoPrompt, StdinPrompt};
use crate::llm::{LlmGenerator, TextGenerator};
use crate::scm::{GitHubClient, PullRequestSource};
use crate::summary::RunSummary;
use crate::templates::TemplateRenderer;
use crate::tracker::{JiraClient, Ticket, TicketSource};
use crate::wiki::{ConfluenceClient, WikiSource};
use tracing::{info, warn};
use url::Url;

/// Owns the clients for one run.
pub struct Runner {
    config: RunnerConfig,
    app: AppConfig,
    jira: JiraClient,
    github: Option<GitHubClient>,
    confluence: Option<ConfluenceClient>,
    generator: Option<LlmGenerator>,
    renderer: TemplateRenderer,
}

impl Runner {
    /// Builds a runner from the provided configuration.
    ///
    /// Credentials are checked before anything else, so a missing one fails
    /// without any network traffic.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if a credential is missing, a URL is invalid,
    /// the config file can't be loaded, or a client can't be built.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        let jira_url = required(config.jira_url(), "JIRA_URL")?;
        let email = required(config.jira_email(), "JIRA_EMAIL")?;
        let api_token = required(config.jira_api_token(), "JIRA_API_TOKEN")?;
        let jira_url = parse_url(jira_url, "JIRA_URL")?;

        let app = load_config(config.config_path())?;
        let renderer = match app.load_prompt_template()? {
            Some(template) => TemplateRenderer::with_template(&template)?,
            None => TemplateRenderer::new()?,
        };

        let jira = JiraClient::new(jira_url, email.to_string(), api_token.to_string())?;

        let github = match config.github_token() {
            Some(token) => Some(GitHubClient::new(token.to_string())?),
            None => {
                warn!("GITHUB_TOKEN not set, pull request context disabled");
                None
            }
        };

        let confluence = match config.confluence_url() {
            Some(url) => Some(ConfluenceClient::new(
                parse_url(url, "CONFLUENCE_URL")?,
                email.to_string(),
                api_token.to_string(),
            )?),
            None => {
                info!("CONFLUENCE_URL not set, wiki context disabled");
                None
            }
        };

        let generator = if config.generate() && !config.preview() {
            Some(LlmGenerator::new(app.llm.as_ref())?)
        } else {
            None
        };

        Ok(Self {
            config,
            app,
            jira,
            github,
            confluence,
            generator,
            renderer,
        })
    }

    /// Executes the full run.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if the ticket search or snapshot write fails.
    /// Per-ticket failures are recorded in the summary instead.
    pub async fn run(&self) -> Result<RunSummary, RunnerError> {
        let prompt: &dyn FieldPrompt = if self.config.interactive() {
            &StdinPrompt
        } else {
            &NoPrompt
        };
        let fields = resolve_fields(&self.jira, self.config.field_overrides(), prompt).await;

        info!(jql = %self.config.jql(), "Searching tickets");
        let tickets = self.jira.search_tickets(self.config.jql(), &fields).await?;

        if tickets.is_empty() {
            warn!("No tickets matched the query");
            return Ok(RunSummary::new(self.config.preview()));
        }

        if self.config.preview() {
            print_preview(&tickets);
            let mut summary = RunSummary::new(true);
            summary.tickets_found = tickets.len();
            return Ok(summary);
        }

        if self.generator.is_some() && fields.test_cases.is_none() {
            warn!("No test case field found; tickets will be enriched but not updated");
        }

        let pipeline = Pipeline {
            sources: Sources {
                tickets: &self.jira as &dyn TicketSource,
                pull_requests: self.github.as_ref().map(|c| c as &dyn PullRequestSource),
                wiki: self.confluence.as_ref().map(|c| c as &dyn WikiSource),
            },
            generator: self.generator.as_ref().map(|g| g as &dyn TextGenerator),
            renderer: &self.renderer,
            fields: &fields,
            options: self.config.enrichment(),
            limits: &self.app.context,
            environments: &self.app.environments,
        };

        let (processed, summary) = pipeline.process_batch(tickets).await;
        write_snapshot(self.config.output_path(), &processed)?;
        Ok(summary)
    }
}

fn required<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, RunnerError> {
    value.ok_or(RunnerError::MissingCredential { name })
}

fn parse_url(value: &str, name: &'static str) -> Result<Url, RunnerError> {
    Url::parse(value).map_err(|source| RunnerError::InvalidUrl {
        name,
        value: value.to_string(),
        source,
    })
}

fn print_preview(tickets: &[Ticket]) {
    println!("\n[PREVIEW] Found {} ticket(s):\n", tickets.len());
    for (i, ticket) in tickets.iter().enumerate() {
        println!("  {}. {} - {}", i + 1, ticket.key, ticket.summary);
        println!(
            "     Status: {} | Assignee: {}",
            ticket.status,
            ticket.assignee.as_deref().unwrap_or("Unassigned")
        );
    }
    println!();
}

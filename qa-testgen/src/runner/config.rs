//! Runner configuration.

use crate::context::EnrichmentOptions;
use crate::fields::FieldOverrides;
use std::path::{Path, PathBuf};

/// Default path of the JSON snapshot.
pub const DEFAULT_OUTPUT_PATH: &str = "jira_tickets.json";

/// Default path of the optional config file.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration for a generation run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Jira site URL.
    jira_url: Option<String>,
    /// Atlassian account email.
    jira_email: Option<String>,
    /// Atlassian API token, shared by Jira and Confluence.
    jira_api_token: Option<String>,
    /// GitHub token; without it pull request context is skipped.
    github_token: Option<String>,
    /// Confluence base URL; without it wiki context is skipped.
    confluence_url: Option<String>,
    /// Issue query.
    jql: String,
    field_overrides: FieldOverrides,
    enrichment: EnrichmentOptions,
    /// Whether to only list matching tickets.
    preview: bool,
    /// Whether to generate and write back test cases.
    generate: bool,
    /// Whether field discovery may prompt on stdin.
    interactive: bool,
    output_path: PathBuf,
    config_path: PathBuf,
}

impl RunnerConfig {
    /// Creates a new configuration for a run.
    pub fn new(jql: String, preview: bool, generate: bool) -> Self {
        Self {
            jira_url: None,
            jira_email: None,
            jira_api_token: None,
            github_token: None,
            confluence_url: None,
            jql,
            field_overrides: FieldOverrides::default(),
            enrichment: EnrichmentOptions::default(),
            preview,
            generate,
            interactive: false,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Sets the Jira credentials. Blank values count as missing.
    pub fn with_jira(
        mut self,
        url: Option<String>,
        email: Option<String>,
        api_token: Option<String>,
    ) -> Self {
        self.jira_url = non_blank(url);
        self.jira_email = non_blank(email);
        self.jira_api_token = non_blank(api_token);
        self
    }

    /// Sets the GitHub token.
    pub fn with_github_token(mut self, token: Option<String>) -> Self {
        self.github_token = non_blank(token);
        self
    }

    /// Sets the Confluence base URL.
    pub fn with_confluence_url(mut self, url: Option<String>) -> Self {
        self.confluence_url = non_blank(url);
        self
    }

    /// Sets explicit field ids.
    pub fn with_field_overrides(mut self, overrides: FieldOverrides) -> Self {
        self.field_overrides = overrides;
        self
    }

    /// Sets which enrichment stages run.
    pub fn with_enrichment(mut self, enrichment: EnrichmentOptions) -> Self {
        self.enrichment = enrichment;
        self
    }

    /// Allows field discovery to prompt on stdin.
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Sets the snapshot path.
    pub fn with_output_path(mut self, output_path: PathBuf) -> Self {
        self.output_path = output_path;
        self
    }

    /// Sets the config file path.
    pub fn with_config_path(mut self, config_path: PathBuf) -> Self {
        self.config_path = config_path;
        self
    }

    pub fn jira_url(&self) -> Option<&str> {
        self.jira_url.as_deref()
    }

    pub fn jira_email(&self) -> Option<&str> {
        self.jira_email.as_deref()
    }

    pub fn jira_api_token(&self) -> Option<&str> {
        self.jira_api_token.as_deref()
    }

    pub fn github_token(&self) -> Option<&str> {
        self.github_token.as_deref()
    }

    pub fn confluence_url(&self) -> Option<&str> {
        self.confluence_url.as_deref()
    }

    /// Returns the issue query.
    pub fn jql(&self) -> &str {
        &self.jql
    }

    pub fn field_overrides(&self) -> &FieldOverrides {
        &self.field_overrides
    }

    pub fn enrichment(&self) -> EnrichmentOptions {
        self.enrichment
    }

    /// Returns whether preview mode is enabled.
    pub fn preview(&self) -> bool {
        self.preview
    }

    /// Returns whether test case generation is enabled.
    pub fn generate(&self) -> bool {
        self.generate
    }

    pub fn interactive(&self) -> bool {
        self.interactive
    }

    /// Returns the snapshot path.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Returns the config file path.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

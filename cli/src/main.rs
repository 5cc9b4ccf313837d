//! CLI for qa-testgen.
//!
//! Fetches Jira tickets, gathers pull request, wiki and ticket context for
//! each, generates QA test cases and writes them back to Jira.

use clap::Parser;
use qa_testgen::{EnrichmentOptions, FieldOverrides, RunSummary, Runner, RunnerConfig, RunnerError};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// qa-testgen - Generate QA test cases for Jira tickets from their linked context.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Jira site URL, e.g. https://acme.atlassian.net
    #[arg(long, env = "JIRA_URL")]
    jira_url: Option<String>,

    /// Atlassian account email.
    #[arg(long, env = "JIRA_EMAIL")]
    jira_email: Option<String>,

    /// Atlassian API token.
    #[arg(long, env = "JIRA_API_TOKEN", hide_env_values = true)]
    jira_api_token: Option<String>,

    /// GitHub token used to find pull requests.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Confluence base URL, e.g. https://acme.atlassian.net/wiki
    #[arg(long, env = "CONFLUENCE_URL")]
    confluence_url: Option<String>,

    /// JQL query selecting the tickets to process.
    #[arg(long, env = "JQL_QUERY", default_value = "status != Done ORDER BY created DESC")]
    jql: String,

    /// Acceptance criteria field id, skips discovery.
    #[arg(long, env = "ACCEPTANCE_CRITERIA_FIELD")]
    acceptance_criteria_field: Option<String>,

    /// Test case field id, skips discovery.
    #[arg(long, env = "TEST_CASES_FIELD")]
    test_cases_field: Option<String>,

    /// Field to read the description from instead of `description`.
    #[arg(long, env = "DESCRIPTION_FIELD")]
    description_field: Option<String>,

    /// Only list matching tickets.
    #[arg(long, env = "PREVIEW_MODE")]
    preview: bool,

    /// Generate test cases and write them back to Jira.
    #[arg(long, env = "GENERATE_TEST_CASES")]
    generate: bool,

    /// Skip parent and sibling ticket context.
    #[arg(long)]
    no_parent_context: bool,

    /// Skip Confluence context.
    #[arg(long)]
    no_wiki: bool,

    /// Skip ticket comments.
    #[arg(long)]
    no_comments: bool,

    /// Skip attachment metadata.
    #[arg(long)]
    no_attachments: bool,

    /// Path of the JSON snapshot.
    #[arg(long, default_value = qa_testgen::runner::DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Path to the config file.
    #[arg(long, default_value = qa_testgen::runner::DEFAULT_CONFIG_PATH)]
    config_path: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    // Both ring and aws-lc-rs end up in the tree; pick one explicitly.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let args = Args::parse();

    match run(args).await {
        Ok(summary) => {
            print_summary(&summary);

            if summary.all_success() {
                ExitCode::from(0)
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<RunSummary, RunnerError> {
    let overrides = FieldOverrides {
        acceptance_criteria: args.acceptance_criteria_field,
        test_cases: args.test_cases_field,
        description: args.description_field,
    };
    let enrichment = EnrichmentOptions {
        parent_context: !args.no_parent_context,
        wiki: !args.no_wiki,
        comments: !args.no_comments,
        attachments: !args.no_attachments,
    };

    let config = RunnerConfig::new(args.jql, args.preview, args.generate)
        .with_jira(args.jira_url, args.jira_email, args.jira_api_token)
        .with_github_token(args.github_token)
        .with_confluence_url(args.confluence_url)
        .with_field_overrides(overrides)
        .with_enrichment(enrichment)
        .with_interactive(std::io::stdin().is_terminal())
        .with_output_path(args.output)
        .with_config_path(args.config_path);

    let runner = Runner::new(config)?;
    runner.run().await
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!(
        "  Mode: {}",
        if summary.preview { "Preview" } else { "Full" }
    );
    println!("  Tickets found: {}", summary.tickets_found);

    if !summary.preview {
        println!("  Tickets processed: {}", summary.tickets_processed);
        println!("  Tickets updated: {}", summary.tickets_updated);
        println!("  Tickets skipped: {}", summary.tickets_skipped);
        println!("  Tickets failed: {}", summary.tickets_failed);
    }
}

//! Per-ticket processing.

use super::ProcessedTicket;
use crate::adf::markdown_to_document;
use crate::config::QaEnvironment;
use crate::context::{assemble, gather, ContextLimits, EnrichmentOptions, Sources};
use crate::fields::ResolvedFields;
use crate::llm::TextGenerator;
use crate::summary::{ProcessingResult, RunSummary};
use crate::templates::TemplateRenderer;
use crate::tracker::Ticket;
use tracing::{error, info, info_span, warn, Instrument};

/// Everything needed to process tickets, borrowed for the length of a batch.
pub struct Pipeline<'a> {
    pub sources: Sources<'a>,
    /// Generation is skipped when `None`.
    pub generator: Option<&'a dyn TextGenerator>,
    pub renderer: &'a TemplateRenderer,
    pub fields: &'a ResolvedFields,
    pub options: EnrichmentOptions,
    pub limits: &'a ContextLimits,
    pub environments: &'a [QaEnvironment],
}

impl Pipeline<'_> {
    /// Processes tickets one after another.
    ///
    /// A failing ticket is recorded and the batch moves on.
    pub async fn process_batch(&self, tickets: Vec<Ticket>) -> (Vec<ProcessedTicket>, RunSummary) {
        let mut summary = RunSummary::new(false);
        summary.tickets_found = tickets.len();

        let total = tickets.len();
        let mut processed = Vec::with_capacity(total);
        for (index, ticket) in tickets.into_iter().enumerate() {
            info!(key = %ticket.key, position = index + 1, total, "Processing ticket");
            let (record, result) = self.process_ticket(ticket).await;
            summary.record_result(&result);
            processed.push(record);
        }
        (processed, summary)
    }

    /// Gathers context for one ticket and, when enabled, generates and
    /// writes back its test cases.
    pub async fn process_ticket(&self, ticket: Ticket) -> (ProcessedTicket, ProcessingResult) {
        let span = info_span!("ticket", key = %ticket.key);

        async move {
            let enrichment =
                gather(self.sources, &ticket, self.fields, self.options, self.limits).await;
            let mut processed = ProcessedTicket::new(ticket, enrichment);
            let key = processed.ticket.key.clone();

            let Some(generator) = self.generator else {
                return (processed, ProcessingResult::Enriched { key });
            };
            let Some(field) = self.fields.test_cases.as_deref() else {
                warn!("No test case field resolved, skipping generation");
                return (
                    processed,
                    ProcessingResult::Skipped {
                        key,
                        reason: "test case field not found".to_string(),
                    },
                );
            };

            let context = assemble(&processed.ticket, &processed.enrichment, self.limits);
            let context_text = context.text();
            info!(
                chars = context_text.chars().count(),
                sections = context.sections().len(),
                "Context assembled"
            );
            processed.test_case_generation_context = Some(context_text);

            let prompt = match self.renderer.render_prompt(&key, &context, self.environments) {
                Ok(prompt) => prompt,
                Err(e) => {
                    error!(error = %e, "Failed to render prompt");
                    return (processed, failed(key, &e));
                }
            };

            let test_cases = match generator.generate(&prompt).await {
                Ok(text) => text,
                Err(e) => {
                    error!(error = %e, "Test case generation failed");
                    return (processed, failed(key, &e));
                }
            };
            let document = markdown_to_document(&test_cases);
            processed.test_cases = Some(test_cases);

            match self
                .sources
                .tickets
                .update_rich_field(&key, field, &document)
                .await
            {
                Ok(()) => {
                    processed.test_cases_updated = true;
                    (processed, ProcessingResult::Updated { key })
                }
                Err(e) => {
                    error!(error = %e, "Failed to write test cases");
                    (processed, failed(key, &e))
                }
            }
        }
        .instrument(span)
        .await
    }
}

fn failed(key: String, error: &dyn std::fmt::Display) -> ProcessingResult {
    ProcessingResult::Failed {
        key,
        error: error.to_string(),
    }
}

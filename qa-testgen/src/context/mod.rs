//! Context aggregation.
//!
//! Aggregation runs in two phases. [`gather`] performs every enabled fetch
//! and returns a [`TicketEnrichment`]; [`assemble`] is pure and turns the
//! ticket plus its enrichment into an [`AggregatedContext`]. Pull request
//! selection and wiki deduplication are settled before assembly starts.

mod assemble;
mod enrichment;
mod format;
mod options;

pub use assemble::{assemble, AggregatedContext, Section, SectionKind, NO_ACCEPTANCE_CRITERIA};
pub use enrichment::{gather, Sources, TicketEnrichment};
pub use format::{
    char_len, format_code_changes, truncate_chars, SectionWriter, FILES_TRUNCATED_MARKER,
    TRUNCATED_MARKER,
};
pub use options::{ContextLimits, EnrichmentOptions};

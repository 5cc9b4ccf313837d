//! Per-ticket outcomes and the run totals built from them.

mod result;
mod run_summary;

pub use result::ProcessingResult;
pub use run_summary::RunSummary;

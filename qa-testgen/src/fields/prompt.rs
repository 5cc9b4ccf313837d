//! Manual field selection fallback.

use super::FieldTarget;
use crate::tracker::FieldInfo;
use std::io::{BufRead, IsTerminal, Write};

/// Number of custom fields listed when asking the operator.
const LISTED_FIELDS: usize = 15;

/// Asks the operator for a field id when discovery finds nothing.
pub trait FieldPrompt: Send + Sync {
    /// Returns the chosen field id, or `None` to skip the field.
    fn ask(&self, target: FieldTarget, candidates: &[FieldInfo]) -> Option<String>;
}

/// Never prompts. Used for non-interactive runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

impl FieldPrompt for NoPrompt {
    fn ask(&self, _target: FieldTarget, _candidates: &[FieldInfo]) -> Option<String> {
        None
    }
}

/// Prompts on stdin when it is attached to a terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompt;

impl FieldPrompt for StdinPrompt {
    fn ask(&self, target: FieldTarget, candidates: &[FieldInfo]) -> Option<String> {
        let stdin = std::io::stdin();
        if !stdin.is_terminal() {
            return None;
        }

        println!(
            "\nNo {} field found. Available custom fields:",
            target.label()
        );
        for field in candidates.iter().take(LISTED_FIELDS) {
            println!("  - {} (ID: {})", field.name, field.id);
        }
        print!(
            "\nEnter field ID to use for {} (or press Enter to skip): ",
            target.label()
        );
        std::io::stdout().flush().ok()?;

        let mut line = String::new();
        stdin.lock().read_line(&mut line).ok()?;
        let choice = line.trim();
        (!choice.is_empty()).then(|| choice.to_string())
    }
}

//! Length-bounded text building.
//!
//! All lengths are counted in chars, never bytes, so a cut can't land inside
//! a multi-byte character.

use crate::scm::CodeChangeSummary;

/// Appended when a section stops accepting entries.
pub const TRUNCATED_MARKER: &str = "\n... (truncated)";

/// Appended when files are dropped from a code change summary.
pub const FILES_TRUNCATED_MARKER: &str = "\n... (truncated - remaining files not shown)";

const PATCH_OPEN: &str = "```diff\n";
const PATCH_CLOSE: &str = "\n```\n";

/// Smallest patch excerpt worth including.
const MIN_PATCH_CHARS: usize = 40;

/// Counts chars in `text`.
#[must_use]
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Keeps the first `limit` chars of `text`, appending "..." when cut.
#[must_use]
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte, _)) => format!("{}...", &text[..byte]),
        None => text.to_string(),
    }
}

/// Accumulates entries of one context section up to a char budget.
///
/// The first entry that would overflow is replaced by [`TRUNCATED_MARKER`]
/// (when the marker itself fits) and the writer rejects everything after it.
#[derive(Debug)]
pub struct SectionWriter {
    budget: usize,
    used: usize,
    text: String,
    closed: bool,
}

impl SectionWriter {
    /// Creates an empty writer holding at most `budget` chars.
    #[must_use]
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            used: 0,
            text: String::new(),
            closed: false,
        }
    }

    /// Appends `entry` if it fits. Returns whether it was written.
    pub fn push(&mut self, entry: &str) -> bool {
        if self.closed {
            return false;
        }

        let len = char_len(entry);
        if self.used + len <= self.budget {
            self.text.push_str(entry);
            self.used += len;
            return true;
        }

        let marker_len = char_len(TRUNCATED_MARKER);
        if self.used + marker_len <= self.budget {
            self.text.push_str(TRUNCATED_MARKER);
            self.used += marker_len;
        }
        self.closed = true;
        false
    }

    /// Returns whether an entry has been rejected.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.closed
    }

    /// Returns the accumulated text.
    #[must_use]
    pub fn finish(self) -> String {
        self.text
    }
}

/// Formats a pull request diff within `budget` chars.
///
/// Files are listed in their original order. When the next file header no
/// longer fits the output ends with [`FILES_TRUNCATED_MARKER`]. Each patch is
/// cut to `min(patch_limit, remaining budget)` chars. Empty summaries produce
/// an empty string.
#[must_use]
pub fn format_code_changes(summary: &CodeChangeSummary, budget: usize, patch_limit: usize) -> String {
    if summary.files.is_empty() {
        return String::new();
    }

    let marker_len = char_len(FILES_TRUNCATED_MARKER);
    let stop = |mut out: String, used: usize| {
        if used + marker_len <= budget {
            out.push_str(FILES_TRUNCATED_MARKER);
        }
        out
    };

    let header = format!(
        "\nCODE CHANGES SUMMARY:\n\
         - Files changed: {}\n\
         - Additions: +{} lines\n\
         - Deletions: -{} lines\n\
         - Total changes: {} lines\n\n\
         DETAILED FILE CHANGES:\n",
        summary.total_files, summary.additions, summary.deletions, summary.changes
    );
    let header_len = char_len(&header);
    if header_len + marker_len > budget {
        return stop(String::new(), 0);
    }

    let mut out = header;
    let mut used = header_len;
    let fence_len = char_len(PATCH_OPEN) + char_len(PATCH_CLOSE);
    let cut_len = char_len(TRUNCATED_MARKER);

    for file in &summary.files {
        let file_header = format!(
            "\nFILE: {} ({})\n   +{} -{} changes\n\n",
            file.filename, file.status, file.additions, file.deletions
        );
        let file_header_len = char_len(&file_header);
        if used + file_header_len + marker_len > budget {
            return stop(out, used);
        }
        out.push_str(&file_header);
        used += file_header_len;

        if file.patch.is_empty() {
            continue;
        }

        let available = budget.saturating_sub(used + marker_len + fence_len + cut_len);
        let cap = patch_limit.min(available);
        if cap < MIN_PATCH_CHARS.min(char_len(&file.patch)) {
            return stop(out, used);
        }

        let mut section = String::from(PATCH_OPEN);
        match file.patch.char_indices().nth(cap) {
            Some((byte, _)) => {
                section.push_str(&file.patch[..byte]);
                section.push_str(TRUNCATED_MARKER);
            }
            None => section.push_str(&file.patch),
        }
        section.push_str(PATCH_CLOSE);

        used += char_len(&section);
        out.push_str(&section);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scm::FileChange;

    fn summary(files: usize, patch_len: usize) -> CodeChangeSummary {
        CodeChangeSummary::from_files(
            (0..files)
                .map(|i| FileChange {
                    filename: format!("src/module_{i}.rs"),
                    status: "modified".to_string(),
                    additions: 10,
                    deletions: 2,
                    changes: 12,
                    patch: "+ let value = compute();\n".repeat(patch_len / 25 + 1),
                })
                .collect(),
        )
    }

    #[test]
    fn truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll...");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("exact", 5), "exact");
    }

    #[test]
    fn section_writer_replaces_overflow_with_marker() {
        let mut writer = SectionWriter::new(40);
        assert!(writer.push("first entry\n"));
        assert!(!writer.push(&"x".repeat(100)));
        assert!(!writer.push("late"));
        assert!(writer.is_truncated());

        let text = writer.finish();
        assert_eq!(text, format!("first entry\n{TRUNCATED_MARKER}"));
        assert!(char_len(&text) <= 40);
    }

    #[test]
    fn section_writer_drops_marker_when_it_cannot_fit() {
        let mut writer = SectionWriter::new(5);
        assert!(writer.push("abcd"));
        assert!(!writer.push("ef"));
        assert_eq!(writer.finish(), "abcd");
    }

    #[test]
    fn small_diff_is_listed_completely() {
        let changes = summary(3, 100);
        let text = format_code_changes(&changes, 8000, 2000);

        assert_eq!(text.matches("\nFILE: ").count(), 3);
        assert!(text.contains("- Files changed: 3"));
        assert!(text.contains("- Additions: +30 lines"));
        assert!(!text.contains(FILES_TRUNCATED_MARKER));
    }

    #[test]
    fn long_patch_is_capped() {
        let changes = summary(1, 5000);
        let text = format_code_changes(&changes, 8000, 2000);

        assert!(text.contains(TRUNCATED_MARKER));
        assert!(char_len(&text) < 2500);
    }

    #[test]
    fn output_never_exceeds_budget() {
        let changes = summary(12, 3000);
        for budget in [0, 10, 44, 100, 250, 400, 1000, 2500, 4000, 8000] {
            let text = format_code_changes(&changes, budget, 2000);
            assert!(
                char_len(&text) <= budget,
                "budget {budget} produced {} chars",
                char_len(&text)
            );

            let listed = text.matches("\nFILE: ").count();
            if listed < changes.files.len() && budget >= char_len(FILES_TRUNCATED_MARKER) {
                assert!(
                    text.ends_with(FILES_TRUNCATED_MARKER),
                    "budget {budget} dropped files without the marker"
                );
            }
        }
    }

    #[test]
    fn empty_diff_formats_to_nothing() {
        assert!(format_code_changes(&summary(0, 0), 8000, 2000).is_empty());
    }
}

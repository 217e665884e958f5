//! Hunk-to-suggestion conversion.
//!
//! A hunk is split into runs of same-typed lines. Every run of added lines
//! becomes one suggestion, anchored on the run before it:
//!
//! - after removed lines, the suggestion replaces exactly those lines with
//!   the added text;
//! - after context lines, the suggestion sits on the last context line and
//!   repeats it ahead of the added text, so accepting the suggestion keeps
//!   that line.
//!
//! Line numbers are source (pre-image) numbers. The diff being converted
//! runs from the pull request's head state to the formatted state, so the
//! source side is the file as it currently stands on the pull request.

pub mod dispatch;

use thiserror::Error;

use crate::models::diff::{DiffLine, DiffLineType, Hunk};
use crate::models::HunkSuggestion;

pub use dispatch::collect_suggestions;

/// Errors from converting a hunk into suggestions.
#[derive(Error, Debug)]
pub enum SuggestError {
    /// An added run opens the hunk, leaving nothing to anchor it to.
    #[error("can't process hunk without leading context:\n{hunk}")]
    MissingLeadingContext { hunk: String },

    /// Two adjacent runs share a line type.
    #[error(
        "invariant violated: consecutive {line_type} groups at indices {first}, {second}:\n{first_text}\n{second_text}"
    )]
    AdjacentGroups {
        line_type: DiffLineType,
        first: usize,
        second: usize,
        first_text: String,
        second_text: String,
    },

    /// A context or removed line carries no source line number.
    #[error("{line_type} line has no source line number: {text:?}")]
    MissingLineNumber { line_type: DiffLineType, text: String },
}

/// A maximal run of consecutive hunk lines sharing one type.
#[derive(Debug, Clone, Copy)]
pub struct LineGroup<'a> {
    pub line_type: DiffLineType,
    pub lines: &'a [DiffLine],
}

impl<'a> LineGroup<'a> {
    fn first(&self) -> &'a DiffLine {
        &self.lines[0]
    }

    fn last(&self) -> &'a DiffLine {
        &self.lines[self.lines.len() - 1]
    }

    fn text(&self) -> String {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }
}

/// Split hunk lines into runs of the same type. Runs are never empty.
pub fn group_lines(lines: &[DiffLine]) -> Vec<LineGroup<'_>> {
    lines
        .chunk_by(|a, b| a.line_type == b.line_type)
        .map(|run| LineGroup {
            line_type: run[0].line_type,
            lines: run,
        })
        .collect()
}

/// Convert one hunk into suggestions, one per run of added lines, in hunk order.
pub fn suggestions_from_hunk(hunk: &Hunk) -> Result<Vec<HunkSuggestion>, SuggestError> {
    let groups = group_lines(&hunk.lines);
    let mut suggestions = Vec::new();

    for (index, added) in groups.iter().enumerate() {
        if added.line_type != DiffLineType::Added {
            continue;
        }

        let Some(anchor) = index.checked_sub(1).map(|i| &groups[i]) else {
            return Err(SuggestError::MissingLeadingContext {
                hunk: hunk.to_string(),
            });
        };

        let (source_start, source_end, kept): (u32, u32, &[DiffLine]) = match anchor.line_type {
            DiffLineType::Removed => (
                source_line(anchor.first())?,
                source_line(anchor.last())?,
                &[],
            ),
            DiffLineType::Context => {
                let last = anchor.last();
                let line = source_line(last)?;
                (line, line, std::slice::from_ref(last))
            }
            DiffLineType::Added => {
                return Err(SuggestError::AdjacentGroups {
                    line_type: DiffLineType::Added,
                    first: index - 1,
                    second: index,
                    first_text: anchor.text(),
                    second_text: added.text(),
                });
            }
        };

        suggestions.push(HunkSuggestion {
            source_start,
            source_end,
            text: join_lines(kept.iter().chain(added.lines)),
        });
    }

    Ok(suggestions)
}

/// Render the comment body posted for a suggestion.
pub fn format_body(message: &str, suggestion: &str) -> String {
    format!("{message}\n\n```suggestion\n{suggestion}\n```\n")
}

fn source_line(line: &DiffLine) -> Result<u32, SuggestError> {
    line.source_line_no
        .ok_or_else(|| SuggestError::MissingLineNumber {
            line_type: line.line_type,
            text: line.text.clone(),
        })
}

/// Concatenate raw line texts and drop the final line terminator.
fn join_lines<'a>(lines: impl Iterator<Item = &'a DiffLine>) -> String {
    let mut text: String = lines.map(|l| l.text.as_str()).collect();
    if text.ends_with('\n') {
        text.pop();
    }
    text
}

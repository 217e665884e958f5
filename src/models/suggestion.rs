//! Suggestion types produced from diff hunks.

use serde::Serialize;

/// A replacement for a line range within one hunk, before it is tied to a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HunkSuggestion {
    /// First source line covered by the suggestion (inclusive).
    pub source_start: u32,
    /// Last source line covered by the suggestion (inclusive).
    pub source_end: u32,
    /// Text that should occupy the range, without the final newline.
    pub text: String,
}

/// A suggestion ready to be posted as a review comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    /// Repository-relative path of the file being commented on.
    pub path: String,
    /// First line of the range (inclusive).
    pub begin_line: u32,
    /// Last line of the range (inclusive).
    pub end_line: u32,
    /// Replacement text for the range.
    pub text: String,
}

impl Suggestion {
    /// Attach a path to a hunk-level suggestion.
    pub fn from_hunk(path: &str, partial: HunkSuggestion) -> Self {
        Self {
            path: path.to_string(),
            begin_line: partial.source_start,
            end_line: partial.source_end,
            text: partial.text,
        }
    }

    /// Whether the suggestion spans more than one line.
    pub fn is_multi_line(&self) -> bool {
        self.begin_line != self.end_line
    }
}

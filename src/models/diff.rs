//! Diff-related types: patched files, hunks, and diff lines.
//!
//! These are plain values produced by [`crate::diff::parser`] and never
//! mutated afterwards. Everything downstream of the parser works on these
//! types only.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The type of a line in a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffLineType {
    /// Line exists only in the new version (added).
    Added,
    /// Line exists only in the old version (removed).
    Removed,
    /// Line is unchanged (context).
    Context,
}

impl DiffLineType {
    /// The unified-diff prefix character for this line type.
    pub fn marker(self) -> char {
        match self {
            DiffLineType::Added => '+',
            DiffLineType::Removed => '-',
            DiffLineType::Context => ' ',
        }
    }
}

impl fmt::Display for DiffLineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffLineType::Added => write!(f, "added"),
            DiffLineType::Removed => write!(f, "removed"),
            DiffLineType::Context => write!(f, "context"),
        }
    }
}

/// A single line in a diff hunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    /// The type of change.
    pub line_type: DiffLineType,
    /// Raw line content without the leading `+`/`-`/space, including the
    /// trailing newline unless the file ends without one.
    pub text: String,
    /// Line number in the source (pre-image) file. `None` for added lines.
    pub source_line_no: Option<u32>,
    /// Line number in the target (post-image) file. `None` for removed lines.
    pub target_line_no: Option<u32>,
}

impl DiffLine {
    pub fn context(text: impl Into<String>, source: u32, target: u32) -> Self {
        Self {
            line_type: DiffLineType::Context,
            text: text.into(),
            source_line_no: Some(source),
            target_line_no: Some(target),
        }
    }

    pub fn added(text: impl Into<String>, target: u32) -> Self {
        Self {
            line_type: DiffLineType::Added,
            text: text.into(),
            source_line_no: None,
            target_line_no: Some(target),
        }
    }

    pub fn removed(text: impl Into<String>, source: u32) -> Self {
        Self {
            line_type: DiffLineType::Removed,
            text: text.into(),
            source_line_no: Some(source),
            target_line_no: None,
        }
    }
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.line_type.marker(), self.text)
    }
}

/// A contiguous hunk within a patched file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    /// Starting line in the source file.
    pub source_start: u32,
    /// Number of lines in the source file.
    pub source_length: u32,
    /// Starting line in the target file.
    pub target_start: u32,
    /// Number of lines in the target file.
    pub target_length: u32,
    /// Optional section header text after the closing `@@`.
    pub section_header: Option<String>,
    /// The lines in this hunk, in diff order.
    pub lines: Vec<DiffLine>,
}

impl fmt::Display for Hunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@@ -{},{} +{},{} @@",
            self.source_start, self.source_length, self.target_start, self.target_length
        )?;
        if let Some(ref header) = self.section_header {
            write!(f, " {header}")?;
        }
        writeln!(f)?;
        for line in &self.lines {
            write!(f, "{line}")?;
            if !line.text.ends_with('\n') {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// The diff for a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchedFile {
    /// Path of the source file, prefix stripped (`/dev/null` for new files).
    pub source_path: String,
    /// Path of the target file, prefix stripped (`/dev/null` for deleted files).
    pub target_path: String,
    /// Whether this is a rename.
    pub is_rename: bool,
    /// Whether this is a binary file.
    pub is_binary: bool,
    /// The hunks in this diff.
    pub hunks: Vec<Hunk>,
}

/// Placeholder path used by unified diffs for a missing side.
pub const DEV_NULL: &str = "/dev/null";

impl PatchedFile {
    /// Whether the file was created by this diff.
    pub fn is_new(&self) -> bool {
        self.source_path == DEV_NULL
    }

    /// Whether the file was removed by this diff.
    pub fn is_deleted(&self) -> bool {
        self.target_path == DEV_NULL
    }

    /// Whether the file exists on both sides of the diff.
    pub fn is_modified(&self) -> bool {
        !self.is_new() && !self.is_deleted()
    }

    /// Returns the most relevant file path (target for non-deletes, source for deletes).
    pub fn path(&self) -> &str {
        if self.is_deleted() {
            &self.source_path
        } else {
            &self.target_path
        }
    }
}

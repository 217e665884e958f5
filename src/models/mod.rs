//! Shared types used across all modules.
//!
//! This module defines the core data structures for diffs, suggestions,
//! review comments, and the run context. Other modules import from here
//! rather than reaching into each other's internals.

pub mod comment;
pub mod context;
pub mod diff;
pub mod suggestion;

pub use comment::ReviewComment;
pub use context::RunContext;
pub use diff::{DiffLine, DiffLineType, Hunk, PatchedFile};
pub use suggestion::{HunkSuggestion, Suggestion};

//! Output renderers for dry runs: terminal and JSON.

pub mod json;
pub mod terminal;

use crate::models::Suggestion;

/// Trait for rendering suggestions to an output format.
pub trait OutputRenderer {
    /// Render suggestions to a string.
    fn render(&self, suggestions: &[Suggestion]) -> String;
}

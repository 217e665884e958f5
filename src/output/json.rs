//! JSON output renderer.
//!
//! Outputs `{"suggestions": [...], "summary": {...}}` format.

use std::collections::BTreeSet;

use crate::models::Suggestion;
use crate::output::OutputRenderer;

/// JSON output renderer.
pub struct JsonRenderer;

impl OutputRenderer for JsonRenderer {
    fn render(&self, suggestions: &[Suggestion]) -> String {
        let files: BTreeSet<&str> = suggestions.iter().map(|s| s.path.as_str()).collect();

        let output = serde_json::json!({
            "suggestions": suggestions,
            "summary": {
                "total": suggestions.len(),
                "files": files.len(),
            },
        });

        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }
}

//! Terminal renderer: suggestions grouped by file, replacement text indented.

use colored::Colorize;

use crate::models::Suggestion;
use crate::output::OutputRenderer;

/// Terminal output renderer with colored, flowing text.
pub struct TerminalRenderer;

impl OutputRenderer for TerminalRenderer {
    fn render(&self, suggestions: &[Suggestion]) -> String {
        if suggestions.is_empty() {
            return format!("{}", "  ✔ No suggestions to make.\n".green());
        }

        let mut output = String::new();
        let mut current_file = "";

        for suggestion in suggestions {
            if suggestion.path != current_file {
                if !current_file.is_empty() {
                    output.push('\n');
                }
                current_file = &suggestion.path;
            }

            let location = if suggestion.is_multi_line() {
                format!(
                    "{}:{}-{}",
                    suggestion.path, suggestion.begin_line, suggestion.end_line
                )
            } else {
                format!("{}:{}", suggestion.path, suggestion.begin_line)
            };

            output.push_str(&format!(" {} {}\n", "✎".cyan().bold(), location.bold()));
            for line in suggestion.text.split('\n') {
                output.push_str(&format!("   {} {}\n", "│".dimmed(), line.green()));
            }
        }

        let noun = if suggestions.len() == 1 { "suggestion" } else { "suggestions" };
        output.push_str(&format!("\n  {} {noun}\n", suggestions.len()));
        output
    }
}

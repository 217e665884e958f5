//! Clap argument types and output format dispatch.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use diffsuggest::models::Suggestion;

/// Post a formatter's diff as suggested changes on the current pull request.
#[derive(Parser, Debug)]
#[command(name = "diffsuggest", version = diffsuggest::constants::VERSION)]
pub struct Cli {
    /// Unified diff from the PR head to the formatted tree, or `-` for stdin.
    pub path: PathBuf,

    /// GitHub token used to list, delete and create review comments.
    #[arg(long, env = diffsuggest::constants::ENV_GITHUB_TOKEN, hide_env_values = true)]
    pub access_token: Option<String>,

    /// Compute suggestions and print them without touching the pull request.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Output format for --dry-run.
    #[arg(long, default_value = "terminal")]
    pub format: OutputFormat,

    /// Text placed above every suggestion (overrides config and environment).
    #[arg(long)]
    pub message: Option<String>,

    /// Enable debug logging.
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Json,
}

impl OutputFormat {
    /// Render suggestions using the renderer for this format.
    pub fn render(&self, suggestions: &[Suggestion]) -> String {
        use diffsuggest::output::OutputRenderer;
        match self {
            OutputFormat::Terminal => {
                diffsuggest::output::terminal::TerminalRenderer.render(suggestions)
            }
            OutputFormat::Json => diffsuggest::output::json::JsonRenderer.render(suggestions),
        }
    }
}

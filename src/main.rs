mod cli;

use diffsuggest::config;
use diffsuggest::diff;
use diffsuggest::env;
use diffsuggest::gateway;
use diffsuggest::models;
use diffsuggest::orchestrator;
use diffsuggest::suggest;

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::args::Cli;
use config::Config;
use env::Env;
use gateway::github::GithubGateway;
use models::RunContext;
use orchestrator::SuggestionOrchestrator;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let env = Env::real();
    let ctx = RunContext::from_env(&env, cli.access_token.clone())
        .context("failed to read the GitHub Actions environment")?;
    tracing::debug!(?ctx, "run context");

    let mut config = Config::load(Some(ctx.repo_path.as_path()), &env)
        .context("failed to load configuration")?;
    config.apply_cli_message(cli.message.as_deref());

    // Everything that can fail on bad input happens before any comment is touched.
    let files = diff::load_patch_set(&cli.path)
        .await
        .with_context(|| format!("failed to load diff {}", cli.path.display()))?;

    let changed = diff::git::changed_files(&ctx.repo_path, &ctx.base_ref, &ctx.head_ref)
        .await
        .context("failed to list files changed by the pull request")?;
    tracing::info!("Files changed by this pull request: {changed:?}");

    let suggestions = suggest::collect_suggestions(&files, &changed, &ctx.repo_path)
        .context("failed to build suggestions from the diff")?;
    tracing::info!(count = suggestions.len(), "computed suggestions");

    if cli.dry_run {
        print!("{}", cli.format.render(&suggestions));
        return Ok(());
    }

    let gateway = GithubGateway::new(&ctx, &config.github.api_url, config.github.per_page)
        .context("failed to set up the GitHub client")?;
    let orchestrator = SuggestionOrchestrator::new(Arc::new(gateway), config.comment.message);

    let summary = orchestrator.run(&suggestions).await?;
    tracing::info!(
        deleted = summary.deleted,
        posted = summary.posted,
        "Done."
    );

    Ok(())
}

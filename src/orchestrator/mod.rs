//! Suggestion run orchestration: clear stale suggestions, then post new ones.
//!
//! Everything runs sequentially. Stale comments are deleted strictly before
//! any new suggestion is posted, so a stale comment and its replacement are
//! never live at the same time. The first failed call aborts the run.

pub mod stale;

use std::sync::Arc;

use thiserror::Error;

use crate::gateway::{GatewayError, ReviewGateway};
use crate::models::Suggestion;
use crate::suggest::format_body;

/// Errors from the orchestrator.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("failed to list review comments: {0}")]
    List(#[source] GatewayError),

    #[error("failed to delete stale comment {url}: {source}")]
    Delete { url: String, source: GatewayError },

    #[error("failed to post suggestion on {path}:{begin_line}-{end_line}: {source}")]
    Post {
        path: String,
        begin_line: u32,
        end_line: u32,
        source: GatewayError,
    },
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Stale suggestion comments removed.
    pub deleted: usize,
    /// New suggestion comments created.
    pub posted: usize,
}

/// Drives a run against a review gateway.
pub struct SuggestionOrchestrator {
    gateway: Arc<dyn ReviewGateway>,
    /// Text placed above every suggestion; also the stale-comment marker.
    message: String,
}

impl SuggestionOrchestrator {
    /// Create a new orchestrator.
    pub fn new(gateway: Arc<dyn ReviewGateway>, message: impl Into<String>) -> Self {
        Self {
            gateway,
            message: message.into(),
        }
    }

    /// Delete stale suggestions, then post `suggestions` in order.
    pub async fn run(&self, suggestions: &[Suggestion]) -> Result<RunSummary, OrchestratorError> {
        let deleted = self.delete_stale().await?;
        let posted = self.post_all(suggestions).await?;
        Ok(RunSummary { deleted, posted })
    }

    /// Remove our earlier suggestions that nobody replied to.
    pub async fn delete_stale(&self) -> Result<usize, OrchestratorError> {
        tracing::info!("Getting old suggestions...");
        let comments = self
            .gateway
            .list_comments()
            .await
            .map_err(OrchestratorError::List)?;

        let stale = stale::select_stale(&comments, &self.message);
        tracing::info!(
            total = comments.len(),
            stale = stale.len(),
            "Deleting old suggestions..."
        );

        for comment in &stale {
            self.gateway
                .delete_comment(&comment.url)
                .await
                .map_err(|source| OrchestratorError::Delete {
                    url: comment.url.clone(),
                    source,
                })?;
            tracing::debug!(id = comment.id, "deleted stale suggestion");
        }

        Ok(stale.len())
    }

    /// Post every suggestion in order.
    pub async fn post_all(&self, suggestions: &[Suggestion]) -> Result<usize, OrchestratorError> {
        tracing::info!("Making {} suggestion(s) on the pull request", suggestions.len());

        let mut last_path: Option<&str> = None;
        for suggestion in suggestions {
            if last_path != Some(suggestion.path.as_str()) {
                tracing::info!("Making suggestions on {}", suggestion.path);
                last_path = Some(&suggestion.path);
            }

            let body = format_body(&self.message, &suggestion.text);
            let created = self
                .gateway
                .post_suggestion(&suggestion.path, suggestion.begin_line, suggestion.end_line, &body)
                .await
                .map_err(|source| OrchestratorError::Post {
                    path: suggestion.path.clone(),
                    begin_line: suggestion.begin_line,
                    end_line: suggestion.end_line,
                    source,
                })?;
            tracing::debug!(id = created.id, url = %created.url, "posted suggestion");
        }

        Ok(suggestions.len())
    }
}

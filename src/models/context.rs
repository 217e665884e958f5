//! Run context: the immutable facts about the pull request being reviewed.
//!
//! Built once at startup from CLI arguments and the GitHub Actions
//! environment, then passed by reference to every component.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::constants::{ENV_GITHUB_EVENT_PATH, ENV_GITHUB_REPOSITORY, ENV_GITHUB_WORKSPACE};
use crate::env::Env;

/// Errors while assembling the run context.
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("failed to read event payload {path}: {source}")]
    ReadEvent {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid event payload {path}: {source}")]
    ParseEvent {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The subset of a `pull_request` webhook event we rely on.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
    pub pull_request: PullRequest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub head: GitRef,
    pub base: GitRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
    #[serde(default)]
    pub sha: String,
}

impl PullRequestEvent {
    /// Load and parse an event payload file.
    pub fn from_file(path: &Path) -> Result<Self, ContextError> {
        let content = std::fs::read_to_string(path).map_err(|e| ContextError::ReadEvent {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| ContextError::ParseEvent {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Everything a run needs to know about where it is operating.
#[derive(Clone)]
pub struct RunContext {
    /// API credential. Absent only in dry-run mode.
    pub access_token: Option<String>,
    /// `owner/name` of the repository.
    pub repository: String,
    pub pull_request_number: u64,
    /// Head commit the suggestions are anchored to.
    pub commit_id: String,
    pub base_ref: String,
    pub head_ref: String,
    /// Local checkout the diff paths are relative to.
    pub repo_path: PathBuf,
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("repository", &self.repository)
            .field("pull_request_number", &self.pull_request_number)
            .field("commit_id", &self.commit_id)
            .field("base_ref", &self.base_ref)
            .field("head_ref", &self.head_ref)
            .field("repo_path", &self.repo_path)
            .finish()
    }
}

impl RunContext {
    /// Assemble a context from the GitHub Actions environment.
    pub fn from_env(env: &Env, access_token: Option<String>) -> Result<Self, ContextError> {
        let repository = require(env, ENV_GITHUB_REPOSITORY)?;
        let event_path = PathBuf::from(require(env, ENV_GITHUB_EVENT_PATH)?);
        let repo_path = PathBuf::from(require(env, ENV_GITHUB_WORKSPACE)?);

        let event = PullRequestEvent::from_file(&event_path)?;
        Ok(Self::from_event(access_token, repository, repo_path, event))
    }

    /// Assemble a context from an already-parsed event.
    pub fn from_event(
        access_token: Option<String>,
        repository: String,
        repo_path: PathBuf,
        event: PullRequestEvent,
    ) -> Self {
        let pr = event.pull_request;
        Self {
            access_token,
            repository,
            pull_request_number: pr.number,
            commit_id: pr.head.sha,
            base_ref: pr.base.ref_name,
            head_ref: pr.head.ref_name,
            repo_path,
        }
    }
}

fn require(env: &Env, name: &str) -> Result<String, ContextError> {
    env.non_empty(name)
        .ok_or_else(|| ContextError::MissingEnvVar(name.to_string()))
}

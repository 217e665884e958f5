//! ReviewGateway trait and the GitHub implementation.
//!
//! The rest of the crate only sees list/post/delete over
//! [`ReviewComment`]s; transport details stay behind this seam so the run
//! logic can be exercised against an in-memory gateway.

pub mod github;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::ReviewComment;

/// Errors from the review comment API.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("no access token configured (pass --access-token or set GITHUB_TOKEN)")]
    MissingToken,

    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("failed to decode API response: {0}")]
    DecodeError(String),
}

/// Access to a pull request's review comments.
#[async_trait]
pub trait ReviewGateway: Send + Sync {
    /// List every review comment on the pull request.
    async fn list_comments(&self) -> Result<Vec<ReviewComment>, GatewayError>;

    /// Post a suggestion comment over `begin_line..=end_line` of `path`.
    async fn post_suggestion(
        &self,
        path: &str,
        begin_line: u32,
        end_line: u32,
        body: &str,
    ) -> Result<ReviewComment, GatewayError>;

    /// Delete the comment at its API `url`.
    async fn delete_comment(&self, url: &str) -> Result<(), GatewayError>;
}

//! Pull request review comments as returned by the GitHub API.

use serde::Deserialize;

/// A review comment on a pull request.
///
/// Only the fields needed to recognise and delete our own comments are
/// kept; everything else in the API response is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReviewComment {
    pub id: u64,
    #[serde(default)]
    pub body: String,
    /// API URL of the comment, used for deletion.
    pub url: String,
    /// Id of the comment this one replies to, if it is a reply.
    #[serde(default)]
    pub in_reply_to_id: Option<u64>,
}

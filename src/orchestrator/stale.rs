//! Stale suggestion detection.
//!
//! A comment is stale when it carries our marker text and nobody has
//! replied to it. Comments with replies are left alone so a reviewer's
//! discussion is never deleted along with the suggestion it hangs off.

use std::collections::HashSet;

use crate::models::ReviewComment;

/// Select the comments that should be deleted before posting fresh suggestions.
pub fn select_stale<'a>(comments: &'a [ReviewComment], marker: &str) -> Vec<&'a ReviewComment> {
    let replied_to: HashSet<u64> = comments.iter().filter_map(|c| c.in_reply_to_id).collect();

    comments
        .iter()
        .filter(|c| c.body.contains(marker))
        .filter(|c| !replied_to.contains(&c.id))
        .collect()
}

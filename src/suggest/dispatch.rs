//! Turn a parsed patch set into suggestions for the files a pull request touches.

use std::collections::BTreeSet;
use std::path::{Component, Path};

use crate::models::{PatchedFile, Suggestion};

use super::{SuggestError, suggestions_from_hunk};

/// Convert every hunk of every eligible file into suggestions.
///
/// A file is eligible when it is modified (present on both sides of the
/// diff) and its workspace-relative path is in `changed_files`. The diff
/// may cover more than the pull request does when base and head have
/// drifted apart, and comments outside the pull request's own diff would be
/// rejected by the API.
///
/// Suggestions come out in patch-set file order, then hunk order.
pub fn collect_suggestions(
    files: &[PatchedFile],
    changed_files: &BTreeSet<String>,
    repo_path: &Path,
) -> Result<Vec<Suggestion>, SuggestError> {
    let mut suggestions = Vec::new();

    for file in files {
        if !file.is_modified() {
            tracing::debug!(path = file.path(), "skipping added or deleted file");
            continue;
        }

        let path = relative_path(file.path(), repo_path);
        if !changed_files.contains(&path) {
            tracing::debug!(%path, "skipping file outside the pull request diff");
            continue;
        }

        for hunk in &file.hunks {
            let partials = suggestions_from_hunk(hunk).inspect_err(|e| {
                tracing::error!(%path, "failed to convert hunk: {e}");
            })?;
            suggestions.extend(partials.into_iter().map(|p| Suggestion::from_hunk(&path, p)));
        }
    }

    Ok(suggestions)
}

/// Express a diff path relative to the workspace, with `/` separators.
///
/// Formatters run from the workspace root usually emit relative paths
/// already; absolute paths under the workspace are made relative, and
/// anything else is passed through unchanged.
pub fn relative_path(path: &str, repo_path: &Path) -> String {
    let as_path = Path::new(path);
    let relative = if as_path.is_absolute() {
        match as_path.strip_prefix(repo_path) {
            Ok(relative) => relative,
            Err(_) => return path.to_string(),
        }
    } else {
        as_path
    };

    relative
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

//! Git CLI wrapper for resolving the files a pull request changes.
//!
//! Shells out to `git` via `tokio::process::Command`. Commands run one at a
//! time in the workspace checkout; a non-zero exit aborts with the captured
//! stderr.

use std::collections::BTreeSet;
use std::path::Path;

use super::DiffError;

/// Fetch both refs from `origin` and list the files that differ between them.
///
/// Compares `origin/<base_ref>..origin/<head_ref>`, so the result is the
/// pull request's own diff range regardless of what is checked out locally.
pub async fn changed_files(
    repo_path: &Path,
    base_ref: &str,
    head_ref: &str,
) -> Result<BTreeSet<String>, DiffError> {
    run_git(repo_path, &["fetch", "origin", base_ref, head_ref]).await?;

    let range = format!("origin/{base_ref}..origin/{head_ref}");
    let output = run_git(repo_path, &["diff", "--name-only", &range]).await?;

    Ok(parse_name_only(&output))
}

/// Parse `git diff --name-only` output into a set of paths.
pub fn parse_name_only(output: &str) -> BTreeSet<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(str::to_string)
        .collect()
}

/// Run a git command in `repo_path` and return its stdout.
async fn run_git(repo_path: &Path, args: &[&str]) -> Result<String, DiffError> {
    tracing::info!("$ git {}", args.join(" "));

    let output = tokio::process::Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()
        .await
        .map_err(|e| DiffError::GitError(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::error!(stderr = %stderr.trim(), "git {} failed", args[0]);
        return Err(DiffError::GitError(format!(
            "git {} failed ({}): {}",
            args.join(" "),
            output.status,
            stderr.trim()
        )));
    }

    String::from_utf8(output.stdout)
        .map_err(|e| DiffError::GitError(format!("git output is not valid UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn git(dir: &Path, args: &[&str]) {
        let status = tokio::process::Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .await
            .unwrap()
            .status;
        assert!(status.success(), "git {args:?} failed");
    }

    async fn commit_all(dir: &Path, message: &str) {
        git(dir, &["add", "."]).await;
        git(dir, &["commit", "-m", message]).await;
    }

    /// Build an upstream repo with `main` and a `feature` branch, and clone it.
    async fn upstream_and_clone(root: &Path) -> std::path::PathBuf {
        let upstream = root.join("upstream");
        std::fs::create_dir(&upstream).unwrap();
        git(&upstream, &["init", "-b", "main"]).await;
        git(&upstream, &["config", "user.email", "test@test.com"]).await;
        git(&upstream, &["config", "user.name", "Test"]).await;
        tokio::fs::write(upstream.join("keep.js"), "a\n").await.unwrap();
        tokio::fs::write(upstream.join("edit.js"), "b\n").await.unwrap();
        commit_all(&upstream, "init").await;

        git(&upstream, &["checkout", "-b", "feature"]).await;
        tokio::fs::write(upstream.join("edit.js"), "b\nc\n").await.unwrap();
        tokio::fs::create_dir(upstream.join("src")).await.unwrap();
        tokio::fs::write(upstream.join("src/new.js"), "d\n").await.unwrap();
        commit_all(&upstream, "feature work").await;
        git(&upstream, &["checkout", "main"]).await;

        let clone = root.join("clone");
        git(
            root,
            &["clone", upstream.to_str().unwrap(), clone.to_str().unwrap()],
        )
        .await;
        clone
    }

    #[test]
    fn parse_name_only_trims_and_skips_blanks() {
        let set = parse_name_only("src/a.js\n\n  src/b.js  \n\n");
        assert_eq!(
            set.into_iter().collect::<Vec<_>>(),
            vec!["src/a.js".to_string(), "src/b.js".to_string()]
        );
    }

    #[tokio::test]
    async fn changed_files_between_branches() {
        let dir = tempfile::tempdir().unwrap();
        let clone = upstream_and_clone(dir.path()).await;

        let changed = changed_files(&clone, "main", "feature").await.unwrap();
        assert_eq!(
            changed.into_iter().collect::<Vec<_>>(),
            vec!["edit.js".to_string(), "src/new.js".to_string()]
        );
    }

    #[tokio::test]
    async fn changed_files_unknown_ref_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let clone = upstream_and_clone(dir.path()).await;

        let err = changed_files(&clone, "main", "no-such-branch")
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("git fetch origin main no-such-branch failed"), "got: {err}");
    }

    #[tokio::test]
    async fn changed_files_in_non_git_dir() {
        let dir = tempfile::tempdir().unwrap();
        let result = changed_files(dir.path(), "main", "feature").await;
        assert!(matches!(result, Err(DiffError::GitError(_))));
    }
}

//! Diff engine: unified diff parsing, diff file input, and the git wrapper
//! that resolves which files a pull request touches.

pub mod file;
pub mod git;
pub mod parser;

use std::path::Path;
use thiserror::Error;

use crate::models::PatchedFile;

/// Errors from the diff engine.
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("git command failed: {0}")]
    GitError(String),

    #[error("failed to read diff file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("diff parse error: {0}")]
    ParseError(String),

    #[error("path not found: {0}")]
    PathNotFound(String),
}

/// Path argument that selects stdin instead of a file.
pub const STDIN_PATH: &str = "-";

/// Read a unified diff from stdin.
pub async fn read_diff_stdin() -> Result<String, DiffError> {
    use tokio::io::AsyncReadExt;
    let mut buf = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buf)
        .await
        .map_err(DiffError::FileReadError)?;
    Ok(buf)
}

/// Read and parse the diff at `path` (or stdin for `-`).
pub async fn load_patch_set(path: &Path) -> Result<Vec<PatchedFile>, DiffError> {
    let content = if path.as_os_str() == STDIN_PATH {
        read_diff_stdin().await?
    } else {
        file::read_diff_file(path).await?
    };
    let files = parser::parse_unified_diff(&content)?;
    tracing::debug!(files = files.len(), "parsed diff");
    Ok(files)
}

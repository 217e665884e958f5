//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! and URLs so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "diffsuggest";

/// Crate version, baked in at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Local config filename (e.g. `.diffsuggest.toml` in the workspace root).
pub const CONFIG_FILENAME: &str = ".diffsuggest.toml";

/// Directory name under `~/.config/` for global config.
pub const CONFIG_DIR: &str = "diffsuggest";

/// Default GitHub REST API base URL.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Preview media type the review comment endpoints are requested with.
pub const GITHUB_ACCEPT: &str = "application/vnd.github.comfort-fade-preview+json";

/// Default page size when listing review comments (GitHub caps this at 100).
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Default explanatory text placed above every suggestion.
///
/// Doubles as the marker used to recognise our own comments on later runs,
/// so changing it orphans comments posted with the previous text.
pub const DEFAULT_COMMENT_MESSAGE: &str = "The `prettier` formatter suggests these changes. To automatically format your code before committing, consider [enabling `prettier` autoformatting in your editor](https://prettier.io/docs/en/editors.html).";

// ── Environment variable names ──────────────────────────────────────

pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_GITHUB_REPOSITORY: &str = "GITHUB_REPOSITORY";
pub const ENV_GITHUB_EVENT_PATH: &str = "GITHUB_EVENT_PATH";
pub const ENV_GITHUB_WORKSPACE: &str = "GITHUB_WORKSPACE";
pub const ENV_API_URL: &str = "DIFFSUGGEST_API_URL";
pub const ENV_MESSAGE: &str = "DIFFSUGGEST_MESSAGE";

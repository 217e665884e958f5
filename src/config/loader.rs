//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables
//! 3. `.diffsuggest.toml` in the workspace root
//! 4. `~/.config/diffsuggest/config.toml` (global defaults)
//! 5. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::{
    DEFAULT_COMMENT_MESSAGE, DEFAULT_PER_PAGE, ENV_API_URL, ENV_MESSAGE, GITHUB_API_URL,
};
use crate::env::Env;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("github.per_page must be between 1 and 100, got {0}")]
    InvalidPerPage(u32),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub comment: CommentConfig,
    pub github: GithubConfig,
}

/// Settings for the comments we post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentConfig {
    /// Text placed above each suggestion block. Also identifies our
    /// comments when cleaning up after a previous run.
    pub message: String,
}

impl Default for CommentConfig {
    fn default() -> Self {
        Self {
            message: DEFAULT_COMMENT_MESSAGE.to_string(),
        }
    }
}

/// GitHub API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub api_url: String,
    pub per_page: u32,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: GITHUB_API_URL.to_string(),
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// One config file as written: only the keys it actually sets.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    comment: CommentLayer,
    github: GithubLayer,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct CommentLayer {
    message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct GithubLayer {
    api_url: Option<String>,
    per_page: Option<u32>,
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// Reads from global config, repo-local config, then applies
    /// environment variable overrides.
    pub fn load(repo_root: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Layer 4: global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                config.merge(global);
            }
        }

        // Layer 3: repo-local config
        if let Some(root) = repo_root {
            let local_path = root.join(crate::constants::CONFIG_FILENAME);
            if local_path.exists() {
                let local = Self::load_file(&local_path)?;
                config.merge(local);
            }
        }

        // Layer 2: environment variables
        config.apply_env_vars(env);

        config.validate()?;
        Ok(config)
    }

    /// Load a config from a specific file.
    fn load_file(path: &Path) -> Result<ConfigLayer, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(crate::constants::CONFIG_DIR).join("config.toml"))
    }

    /// Apply a file layer on top of this config. Every key the layer sets
    /// wins, including one that restates the built-in default.
    fn merge(&mut self, layer: ConfigLayer) {
        if let Some(message) = layer.comment.message {
            self.comment.message = message;
        }
        if let Some(api_url) = layer.github.api_url {
            self.github.api_url = api_url.trim_end_matches('/').to_string();
        }
        if let Some(per_page) = layer.github.per_page {
            self.github.per_page = per_page;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Some(val) = env.non_empty(ENV_API_URL) {
            self.github.api_url = val.trim_end_matches('/').to_string();
        }
        if let Some(val) = env.non_empty(ENV_MESSAGE) {
            self.comment.message = val;
        }
    }

    /// Apply a `--message` flag, which outranks every other layer.
    pub fn apply_cli_message(&mut self, message: Option<&str>) {
        if let Some(message) = message.map(str::trim).filter(|m| !m.is_empty()) {
            self.comment.message = message.to_string();
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.github.per_page) {
            return Err(ConfigError::InvalidPerPage(self.github.per_page));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.comment.message, DEFAULT_COMMENT_MESSAGE);
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.github.per_page, 100);
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[comment]
message = "rustfmt would like a word."

[github]
api_url = "https://ghe.example.com/api/v3"
per_page = 50
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.comment.message, "rustfmt would like a word.");
        assert_eq!(config.github.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.github.per_page, 50);
    }

    #[test]
    fn parse_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str("[github]\nper_page = 10\n").unwrap();
        assert_eq!(config.comment.message, DEFAULT_COMMENT_MESSAGE);
        assert_eq!(config.github.api_url, GITHUB_API_URL);
        assert_eq!(config.github.per_page, 10);
    }

    #[test]
    fn merge_applies_keys_the_layer_sets() {
        let mut base = Config::default();
        let layer: ConfigLayer =
            toml::from_str("[comment]\nmessage = \"custom\"\n[github]\nper_page = 25\n").unwrap();

        base.merge(layer);

        assert_eq!(base.comment.message, "custom");
        assert_eq!(base.github.per_page, 25);
        assert_eq!(base.github.api_url, GITHUB_API_URL);
    }

    #[test]
    fn merge_leaves_unset_keys_alone() {
        let mut base = Config::default();
        base.github.api_url = "http://localhost:9000".to_string();

        base.merge(ConfigLayer::default());

        assert_eq!(base.github.api_url, "http://localhost:9000");
    }

    #[test]
    fn later_layer_can_restore_default_values() {
        let mut config = Config::default();
        let global: ConfigLayer = toml::from_str(
            "[comment]\nmessage = \"global\"\n[github]\nper_page = 20\n",
        )
        .unwrap();
        let local: ConfigLayer = toml::from_str(&format!(
            "[comment]\nmessage = {:?}\n[github]\nper_page = 100\n",
            DEFAULT_COMMENT_MESSAGE
        ))
        .unwrap();

        config.merge(global);
        config.merge(local);

        assert_eq!(config.comment.message, DEFAULT_COMMENT_MESSAGE);
        assert_eq!(config.github.per_page, 100);
    }

    #[test]
    fn env_vars_override_file_values() {
        let mut config = Config::default();
        config.comment.message = "from file".to_string();
        let env = Env::mock([
            (ENV_API_URL, "http://127.0.0.1:8080/"),
            (ENV_MESSAGE, "from env"),
        ]);

        config.apply_env_vars(&env);

        assert_eq!(config.github.api_url, "http://127.0.0.1:8080");
        assert_eq!(config.comment.message, "from env");
    }

    #[test]
    fn blank_env_vars_are_ignored() {
        let mut config = Config::default();
        config.apply_env_vars(&Env::mock([(ENV_MESSAGE, "  ")]));
        assert_eq!(config.comment.message, DEFAULT_COMMENT_MESSAGE);
    }

    #[test]
    fn cli_message_wins() {
        let mut config = Config::default();
        config.apply_env_vars(&Env::mock([(ENV_MESSAGE, "from env")]));
        config.apply_cli_message(Some("from cli"));
        assert_eq!(config.comment.message, "from cli");

        config.apply_cli_message(None);
        assert_eq!(config.comment.message, "from cli");
    }

    #[test]
    fn load_reads_repo_local_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".diffsuggest.toml"),
            "[comment]\nmessage = \"local\"\n",
        )
        .unwrap();

        let config = Config::load(Some(dir.path()), &Env::mock(Vec::<(&str, &str)>::new())).unwrap();
        assert_eq!(config.comment.message, "local");
    }

    #[test]
    fn load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".diffsuggest.toml"), "[comment\nmessage = 1").unwrap();

        let err = Config::load(Some(dir.path()), &Env::mock(Vec::<(&str, &str)>::new())).unwrap_err();
        assert!(matches!(err, ConfigError::ParseFile { .. }));
    }

    #[test]
    fn load_rejects_out_of_range_page_size() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".diffsuggest.toml"), "[github]\nper_page = 500\n").unwrap();

        let err = Config::load(Some(dir.path()), &Env::mock(Vec::<(&str, &str)>::new())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPerPage(500)));
    }
}

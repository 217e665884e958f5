//! Configuration loading and layering.
//!
//! Handles `.diffsuggest.toml` loading, environment variable resolution,
//! and CLI flag merging with proper priority ordering.

pub mod loader;

pub use loader::{CommentConfig, Config, ConfigError, GithubConfig};

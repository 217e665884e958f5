//! diffsuggest: turn a formatter diff into GitHub suggested changes (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod config;
pub mod constants;
pub mod diff;
pub mod env;
pub mod gateway;
pub mod models;
pub mod orchestrator;
pub mod output;
pub mod suggest;

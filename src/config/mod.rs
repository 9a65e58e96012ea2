//! Configuration model for ralph.
//!
//! This module defines the Config struct that represents `config/ralph.yaml`
//! (or the older `config/ralph.json`).
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! sensible defaults for optional fields, and validation of config values.

mod legacy;
mod model;
mod operations;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export public API
pub use model::Config;
pub use types::{
    DEFAULT_CONFIG_PATH, LEGACY_CONFIG_PATH, PathsConfig, RepoConfig, ReviewerConfig, TrackerConfig,
};

//! Config loading, validation, and utility operations.

use super::model::Config;
use crate::error::{RalphError, Result};
use std::path::Path;

impl Config {
    /// Load config from a YAML file, or from the legacy JSON layout when the
    /// file ends in `.json`.
    ///
    /// Unknown fields are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(RalphError::UserError)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            RalphError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_legacy_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Load config from `path`, or fall back to defaults when the file does
    /// not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "config file not found, using defaults"
            );
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse config from a YAML string.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // Empty file: all defaults.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| RalphError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `max_parallel` must be positive
    /// - tracker and reviewer timeouts must be positive
    /// - tracker and reviewer commands must be non-empty
    pub fn validate(&self) -> Result<()> {
        if self.max_parallel == 0 {
            return Err(RalphError::UserError(
                "config validation failed: max_parallel must be greater than 0".to_string(),
            ));
        }

        if self.tracker.timeout_seconds == 0 {
            return Err(RalphError::UserError(
                "config validation failed: tracker.timeout_seconds must be greater than 0"
                    .to_string(),
            ));
        }

        if self.reviewer.timeout_seconds == 0 {
            return Err(RalphError::UserError(
                "config validation failed: reviewer.timeout_seconds must be greater than 0"
                    .to_string(),
            ));
        }

        if self.tracker.command.trim().is_empty() {
            return Err(RalphError::UserError(
                "config validation failed: tracker.command must be non-empty".to_string(),
            ));
        }

        if self.reviewer.command.trim().is_empty() {
            return Err(RalphError::UserError(
                "config validation failed: reviewer.command must be non-empty".to_string(),
            ));
        }

        if self.executor.trim().is_empty() {
            return Err(RalphError::UserError(
                "config validation failed: executor must be non-empty".to_string(),
            ));
        }

        Ok(())
    }
}

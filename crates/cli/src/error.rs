//! Error types for CLI operations.

use std::path::Path;

use thiserror::Error;

/// Host-level failures, reported through `anyhow` at the top level
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Input file not found
    #[error("Input file not found: {path}")]
    InputNotFound { path: String },

    /// Configuration is invalid
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    /// Input contains units that are not valid envelopes
    #[error("{malformed} of {units} input units are malformed")]
    MalformedInput { units: u64, malformed: u64 },

    /// Outcome writer failed
    #[error("Failed to write outcomes to {path}: {source}")]
    OutcomeWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    pub fn config_not_found(path: &Path) -> Self {
        Self::ConfigNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn input_not_found(path: &Path) -> Self {
        Self::InputNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    pub fn outcome_write(path: &Path, source: std::io::Error) -> Self {
        Self::OutcomeWrite {
            path: path.display().to_string(),
            source,
        }
    }
}

//! Layered error definitions
//!
//! Categorized by source: config / envelope / gateway / admission

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error; fatal to the whole engine
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Envelope Errors =====
    /// Inbound unit does not have the envelope shape; nothing is dispatched
    #[error("malformed envelope: {reason}")]
    MalformedEnvelope { reason: String },

    // ===== Delivery Errors =====
    /// Gateway rejected or failed to deliver a message
    #[error("gateway '{gateway}' error: {reason}")]
    Gateway { gateway: String, reason: String },

    /// No permit was issued before the acquire timeout elapsed
    #[error("rate limit timeout after {waited_ms}ms")]
    RateLimitTimeout { waited_ms: u64 },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create malformed envelope error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedEnvelope {
            reason: reason.into(),
        }
    }

    /// Create gateway error
    pub fn gateway(gateway: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Gateway {
            gateway: gateway.into(),
            reason: reason.into(),
        }
    }

    /// Human-readable reason recorded on a per-recipient failure.
    ///
    /// Gateway and envelope errors report the bare reason without the wrapper prefix.
    pub fn failure_reason(&self) -> String {
        match self {
            Self::Gateway { reason, .. } | Self::MalformedEnvelope { reason } => reason.clone(),
            Self::RateLimitTimeout { .. } => crate::RATE_LIMIT_TIMEOUT_REASON.to_string(),
            other => other.to_string(),
        }
    }
}

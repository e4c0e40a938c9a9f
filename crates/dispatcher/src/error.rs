//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
///
/// Per-recipient failures never surface here; they are recorded as
/// [`contracts::DispatchResult`] failures instead.
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Gateway creation error
    #[error("failed to create gateway '{name}': {message}")]
    GatewayCreation { name: String, message: String },

    /// Configuration or envelope error (from contract)
    #[error(transparent)]
    Contract(#[from] contracts::ContractError),
}

impl DispatcherError {
    /// Create a gateway creation error
    pub fn gateway_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::GatewayCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}

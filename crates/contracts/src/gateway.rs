//! GatewayClient trait - Dispatcher output interface
//!
//! Defines the capability to deliver one message to one recipient.

use crate::{ContractError, RecipientId};

/// Delivery gateway trait
///
/// Implementations are shared by every concurrent dispatch, so `send` takes
/// `&self`: a gateway must be stateless or synchronize internally. Its
/// connection and credential lifetime is owned by the caller and outlives
/// any single dispatch.
#[trait_variant::make(GatewayClient: Send)]
pub trait LocalGatewayClient {
    /// Gateway name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver `body` to `recipient`
    ///
    /// # Errors
    /// Returns [`ContractError::Gateway`] carrying a human-readable reason on
    /// any transport or provider rejection.
    async fn send(&self, recipient: &RecipientId, body: &str) -> Result<String, ContractError>;
}

//! LogGateway - logs each message instead of delivering it

use std::sync::atomic::{AtomicU64, Ordering};

use contracts::{ContractError, GatewayClient, RecipientId};
use tracing::{info, instrument};

/// Gateway that only logs sends, for dry runs and local development
#[derive(Debug)]
pub struct LogGateway {
    name: String,
    seq: AtomicU64,
}

impl LogGateway {
    /// Create a new LogGateway with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            seq: AtomicU64::new(0),
        }
    }
}

impl GatewayClient for LogGateway {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_gateway_send",
        skip(self, body),
        fields(gateway = %self.name, recipient = %recipient)
    )]
    async fn send(&self, recipient: &RecipientId, body: &str) -> Result<String, ContractError> {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        let id = format!("{}-{seq}", self.name);
        info!(id = %id, body_len = body.len(), "Message logged");
        Ok(id)
    }
}

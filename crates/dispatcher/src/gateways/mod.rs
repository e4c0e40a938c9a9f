//! Gateway implementations
//!
//! Contains LogGateway, FileGateway and MockGateway, plus [`AnyGateway`] which
//! selects one of them from configuration.

mod file;
mod log;
mod mock;

pub use self::file::{FileGateway, FileGatewayConfig};
pub use self::log::LogGateway;
pub use self::mock::{MockCall, MockGateway, MockGatewayConfig};

use contracts::{ContractError, GatewayClient, GatewayConfig, GatewayKind, RecipientId};
use tracing::{info, instrument};

use crate::error::DispatcherError;

/// Configuration-selected gateway
pub enum AnyGateway {
    Log(LogGateway),
    File(FileGateway),
    Mock(MockGateway),
}

impl AnyGateway {
    /// Build the gateway described by `config`
    #[instrument(
        name = "gateway_from_config",
        skip(config),
        fields(gateway = %config.name, kind = ?config.kind)
    )]
    pub async fn from_config(config: &GatewayConfig) -> Result<Self, DispatcherError> {
        let gateway = match config.kind {
            GatewayKind::Log => Self::Log(LogGateway::new(&config.name)),
            GatewayKind::File => Self::File(
                FileGateway::from_params(&config.name, &config.params)
                    .await
                    .map_err(|e| DispatcherError::gateway_creation(&config.name, e.to_string()))?,
            ),
            GatewayKind::Mock => Self::Mock(
                MockGateway::from_params(&config.name, &config.params)
                    .map_err(|e| DispatcherError::gateway_creation(&config.name, e.to_string()))?,
            ),
        };
        info!("Gateway ready");
        Ok(gateway)
    }

    pub fn kind(&self) -> GatewayKind {
        match self {
            Self::Log(_) => GatewayKind::Log,
            Self::File(_) => GatewayKind::File,
            Self::Mock(_) => GatewayKind::Mock,
        }
    }
}

impl GatewayClient for AnyGateway {
    fn name(&self) -> &str {
        match self {
            Self::Log(g) => g.name(),
            Self::File(g) => g.name(),
            Self::Mock(g) => g.name(),
        }
    }

    async fn send(&self, recipient: &RecipientId, body: &str) -> Result<String, ContractError> {
        match self {
            Self::Log(g) => g.send(recipient, body).await,
            Self::File(g) => g.send(recipient, body).await,
            Self::Mock(g) => g.send(recipient, body).await,
        }
    }
}

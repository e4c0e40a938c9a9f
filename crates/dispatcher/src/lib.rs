//! # Dispatcher
//!
//! Envelope dispatch module.
//!
//! Responsibilities:
//! - Parse inbound units into `Envelope`s
//! - Admit every gateway call through a shared fixed-window `RateLimiter`
//! - Send to each recipient in order, turning failures into results
//! - Aggregate results into a classification and attribute set

pub mod aggregator;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod gateways;
pub mod metrics;
pub mod rate_limiter;

pub use aggregator::{aggregate, classify};
pub use contracts::{AggregateOutcome, DispatchResult, Envelope, GatewayClient};
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use envelope::EnvelopeParser;
pub use error::DispatcherError;
pub use gateways::{
    AnyGateway, FileGateway, FileGatewayConfig, LogGateway, MockCall, MockGateway,
    MockGatewayConfig,
};
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use rate_limiter::{Admission, RateLimiter, RateLimiterStats};

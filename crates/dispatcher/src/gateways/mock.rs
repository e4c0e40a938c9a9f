//! MockGateway - scripted gateway for tests and rehearsals
//!
//! Fails for a configured set of recipients and records every call, so
//! callers can assert on order, count and pacing.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use contracts::{ContractError, GatewayClient, RecipientId};
use tokio::time::Instant;
use tracing::{debug, instrument};

const DEFAULT_FAILURE_REASON: &str = "rejected by mock gateway";

/// Mock gateway configuration
#[derive(Debug, Clone)]
pub struct MockGatewayConfig {
    /// Recipients whose sends fail
    pub fail_recipients: HashSet<RecipientId>,
    /// Reason carried by injected failures
    pub failure_reason: String,
    /// Simulated latency of every send
    pub delay: Duration,
}

impl Default for MockGatewayConfig {
    fn default() -> Self {
        Self {
            fail_recipients: HashSet::new(),
            failure_reason: DEFAULT_FAILURE_REASON.to_string(),
            delay: Duration::ZERO,
        }
    }
}

impl MockGatewayConfig {
    /// Fail sends to the given recipients
    pub fn failing<I, R>(recipients: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RecipientId>,
    {
        Self {
            fail_recipients: recipients.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Create config from params map
    ///
    /// - `fail_recipients`: comma separated list
    /// - `failure_reason`: reason for injected failures
    /// - `delay_ms`: per-send latency
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ContractError> {
        let fail_recipients = params
            .get("fail_recipients")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(RecipientId::from)
                    .collect()
            })
            .unwrap_or_default();

        let failure_reason = params
            .get("failure_reason")
            .cloned()
            .unwrap_or_else(|| DEFAULT_FAILURE_REASON.to_string());

        let delay = match params.get("delay_ms") {
            Some(raw) => {
                let ms = raw.trim().parse::<u64>().map_err(|e| {
                    ContractError::config_validation(
                        "gateway.params.delay_ms",
                        format!("invalid delay '{raw}': {e}"),
                    )
                })?;
                Duration::from_millis(ms)
            }
            None => Duration::ZERO,
        };

        Ok(Self {
            fail_recipients,
            failure_reason,
            delay,
        })
    }
}

/// A recorded send
#[derive(Debug, Clone)]
pub struct MockCall {
    pub recipient: RecipientId,
    pub body: String,
    pub at: Instant,
}

/// Scripted gateway
pub struct MockGateway {
    name: String,
    config: MockGatewayConfig,
    next_id: AtomicU64,
    calls: Mutex<Vec<MockCall>>,
}

impl MockGateway {
    /// Gateway that accepts every send
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, MockGatewayConfig::default())
    }

    /// Gateway with injected failures
    pub fn with_config(name: impl Into<String>, config: MockGatewayConfig) -> Self {
        Self {
            name: name.into(),
            config,
            next_id: AtomicU64::new(1000),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        Ok(Self::with_config(name, MockGatewayConfig::from_params(params)?))
    }

    /// Every send so far, in call order
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock_calls().clone()
    }

    /// Number of sends so far
    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }

    /// Recipients in call order
    pub fn recipients(&self) -> Vec<RecipientId> {
        self.lock_calls().iter().map(|c| c.recipient.clone()).collect()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<MockCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, recipient: &RecipientId, body: &str) {
        self.lock_calls().push(MockCall {
            recipient: recipient.clone(),
            body: body.to_string(),
            at: Instant::now(),
        });
    }
}

impl GatewayClient for MockGateway {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "mock_gateway_send",
        skip(self, body),
        fields(gateway = %self.name, recipient = %recipient)
    )]
    async fn send(&self, recipient: &RecipientId, body: &str) -> Result<String, ContractError> {
        self.record(recipient, body);

        if !self.config.delay.is_zero() {
            tokio::time::sleep(self.config.delay).await;
        }

        if self.config.fail_recipients.contains(recipient) {
            debug!("Injected failure");
            return Err(ContractError::gateway(
                &self.name,
                &self.config.failure_reason,
            ));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(format!("mock-{id}"))
    }
}

//! Dispatcher - sends one envelope to each of its recipients

use std::sync::Arc;
use std::time::Duration;

use contracts::{
    AggregateOutcome, ContractError, DispatchResult, Envelope, GatewayClient, RateLimitConfig,
    RecipientId,
};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::aggregator::aggregate;
use crate::error::DispatcherError;
use crate::metrics::{DispatchMetrics, MetricsSnapshot};
use crate::rate_limiter::RateLimiter;

/// Builder for creating a Dispatcher
pub struct DispatcherBuilder<G> {
    gateway: Arc<G>,
    limiter: Option<Arc<RateLimiter>>,
    acquire_timeout: Duration,
    rate_limit: Option<RateLimitConfig>,
}

impl<G: GatewayClient> DispatcherBuilder<G> {
    /// Start a builder around a caller-owned gateway
    ///
    /// Without further configuration the dispatcher calls the gateway with no
    /// admission control.
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            limiter: None,
            acquire_timeout: RateLimitConfig::default().acquire_timeout(),
            rate_limit: None,
        }
    }

    /// Create a private limiter from configuration at build time
    ///
    /// When `config.enabled` is false the limiter is bypassed entirely.
    pub fn rate_limit(mut self, config: &RateLimitConfig) -> Self {
        self.acquire_timeout = config.acquire_timeout();
        self.rate_limit = Some(config.clone());
        self
    }

    /// Share an existing limiter with other dispatchers
    pub fn shared_limiter(mut self, limiter: Arc<RateLimiter>, acquire_timeout: Duration) -> Self {
        self.limiter = Some(limiter);
        self.acquire_timeout = acquire_timeout;
        self.rate_limit = None;
        self
    }

    /// Build the dispatcher
    ///
    /// # Errors
    /// Returns [`DispatcherError::Contract`] when the rate limit configuration
    /// is invalid, even if rate limiting is disabled.
    #[instrument(name = "dispatcher_builder_build", skip(self), fields(gateway = %self.gateway.name()))]
    pub fn build(self) -> Result<Dispatcher<G>, DispatcherError> {
        let limiter = match &self.rate_limit {
            Some(config) => {
                let limiter = RateLimiter::from_config(config)?;
                config.enabled.then(|| Arc::new(limiter))
            }
            None => self.limiter,
        };

        info!(
            rate_limited = limiter.is_some(),
            acquire_timeout_ms = self.acquire_timeout.as_millis() as u64,
            "Dispatcher ready"
        );

        Ok(Dispatcher {
            gateway: self.gateway,
            limiter,
            acquire_timeout: self.acquire_timeout,
            metrics: Arc::new(DispatchMetrics::new()),
        })
    }
}

/// Sends an envelope to every recipient through the gateway, admitting each
/// send through the shared rate limiter
///
/// Per-recipient failures never escape: a limiter timeout or gateway error
/// becomes a failed [`DispatchResult`] and dispatch moves on to the next
/// recipient. No retries are performed.
///
/// Cloning is cheap and clones share the gateway, the limiter and metrics, so
/// one dispatcher can be handed to every worker.
pub struct Dispatcher<G> {
    gateway: Arc<G>,
    limiter: Option<Arc<RateLimiter>>,
    acquire_timeout: Duration,
    metrics: Arc<DispatchMetrics>,
}

impl<G> Clone for Dispatcher<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            limiter: self.limiter.clone(),
            acquire_timeout: self.acquire_timeout,
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<G: GatewayClient> Dispatcher<G> {
    /// Gateway used by this dispatcher
    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Limiter in use, `None` when rate limiting is disabled
    pub fn limiter(&self) -> Option<&Arc<RateLimiter>> {
        self.limiter.as_ref()
    }

    /// Get metrics snapshot
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Dispatch `envelope`, one result per recipient in envelope order
    #[instrument(
        name = "dispatcher_dispatch",
        skip(self, envelope),
        fields(gateway = %self.gateway.name(), recipients = envelope.len())
    )]
    pub async fn dispatch(&self, envelope: &Envelope) -> Vec<DispatchResult> {
        self.metrics.inc_envelopes();

        let mut results = Vec::with_capacity(envelope.len());
        for recipient in envelope.recipients() {
            results.push(self.dispatch_one(recipient, envelope.body()).await);
        }

        let failed = results.iter().filter(|r| !r.is_success()).count();
        info!(
            succeeded = results.len() - failed,
            failed, "Envelope dispatched"
        );
        results
    }

    /// Dispatch and aggregate in one call
    pub async fn dispatch_and_aggregate(&self, envelope: &Envelope) -> AggregateOutcome {
        aggregate(&self.dispatch(envelope).await)
    }

    async fn dispatch_one(&self, recipient: &RecipientId, body: &str) -> DispatchResult {
        if let Some(limiter) = &self.limiter {
            let started = Instant::now();
            let admission = limiter.acquire(self.acquire_timeout).await;
            let waited = started.elapsed();
            observability::record_rate_limit_wait_ms(waited.as_secs_f64() * 1000.0);

            if !admission.is_granted() {
                self.metrics.inc_permits_timed_out();
                observability::record_rate_limit_timeout();
                observability::record_recipient_outcome(false);
                let err = ContractError::RateLimitTimeout {
                    waited_ms: waited.as_millis() as u64,
                };
                warn!(recipient = %recipient, error = %err, "No permit before acquire timeout");
                return DispatchResult::failure(recipient.clone(), err.failure_reason());
            }
            self.metrics.inc_permits_granted();
        }

        match self.gateway.send(recipient, body).await {
            Ok(gateway_id) => {
                self.metrics.inc_gateway_successes();
                observability::record_recipient_outcome(true);
                debug!(recipient = %recipient, gateway_id = %gateway_id, "Sent");
                DispatchResult::success(recipient.clone(), gateway_id)
            }
            Err(e) => {
                self.metrics.inc_gateway_failures();
                observability::record_recipient_outcome(false);
                error!(recipient = %recipient, error = %e, "Gateway send failed");
                DispatchResult::failure(recipient.clone(), e.failure_reason())
            }
        }
    }
}

//! Dispatch metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one dispatcher, shared by all of its clones
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Envelopes dispatched
    envelopes: AtomicU64,
    /// Permits issued by the limiter
    permits_granted: AtomicU64,
    /// Acquire calls that timed out
    permits_timed_out: AtomicU64,
    /// Gateway sends that succeeded
    gateway_successes: AtomicU64,
    /// Gateway sends that failed
    gateway_failures: AtomicU64,
}

impl DispatchMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn envelopes(&self) -> u64 {
        self.envelopes.load(Ordering::Relaxed)
    }

    pub fn inc_envelopes(&self) {
        self.envelopes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn permits_granted(&self) -> u64 {
        self.permits_granted.load(Ordering::Relaxed)
    }

    pub fn inc_permits_granted(&self) {
        self.permits_granted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn permits_timed_out(&self) -> u64 {
        self.permits_timed_out.load(Ordering::Relaxed)
    }

    pub fn inc_permits_timed_out(&self) {
        self.permits_timed_out.fetch_add(1, Ordering::Relaxed);
    }

    pub fn gateway_successes(&self) -> u64 {
        self.gateway_successes.load(Ordering::Relaxed)
    }

    pub fn inc_gateway_successes(&self) {
        self.gateway_successes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn gateway_failures(&self) -> u64 {
        self.gateway_failures.load(Ordering::Relaxed)
    }

    pub fn inc_gateway_failures(&self) {
        self.gateway_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            envelopes: self.envelopes(),
            permits_granted: self.permits_granted(),
            permits_timed_out: self.permits_timed_out(),
            gateway_successes: self.gateway_successes(),
            gateway_failures: self.gateway_failures(),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub envelopes: u64,
    pub permits_granted: u64,
    pub permits_timed_out: u64,
    pub gateway_successes: u64,
    pub gateway_failures: u64,
}

impl MetricsSnapshot {
    /// Gateway calls actually made
    pub fn gateway_calls(&self) -> u64 {
        self.gateway_successes + self.gateway_failures
    }
}

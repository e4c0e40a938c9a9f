//! Notifier metrics
//!
//! Prometheus-facing recording functions plus an in-memory aggregator used
//! for end-of-run summaries.

use contracts::{AggregateOutcome, Classification};
use metrics::{counter, histogram};

/// Record one recipient outcome
pub fn record_recipient_outcome(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("notifier_recipients_total", "outcome" => outcome).increment(1);
}

/// Record a dispatched envelope and how long it took
///
/// # Example
///
/// ```ignore
/// let outcome = dispatcher.dispatch_and_aggregate(&envelope).await;
/// observability::record_envelope(outcome.classification, started.elapsed().as_secs_f64() * 1000.0);
/// ```
pub fn record_envelope(classification: Classification, duration_ms: f64) {
    counter!(
        "notifier_envelopes_total",
        "classification" => classification.as_str()
    )
    .increment(1);
    histogram!("notifier_envelope_duration_ms").record(duration_ms);
}

/// Record an inbound unit rejected by the parser
pub fn record_malformed_envelope() {
    counter!("notifier_envelopes_malformed_total").increment(1);
}

/// Record an acquire call that gave up
pub fn record_rate_limit_timeout() {
    counter!("notifier_rate_limit_timeouts_total").increment(1);
}

/// Record time spent waiting for a permit, granted or not
pub fn record_rate_limit_wait_ms(wait_ms: f64) {
    histogram!("notifier_rate_limit_wait_ms").record(wait_ms);
}

/// In-memory outcome tally
///
/// Not thread-safe on its own; the host owns one behind its collector task.
#[derive(Debug, Clone, Default)]
pub struct OutcomeStatsAggregator {
    pub all_succeeded: u64,
    pub partial_failure: u64,
    pub all_failed: u64,

    /// Units that never became an envelope
    pub malformed: u64,

    pub recipients_succeeded: u64,
    pub recipients_failed: u64,

    /// Per-envelope dispatch duration (ms)
    pub duration_stats: RunningStats,
}

impl OutcomeStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one dispatched envelope
    pub fn update(&mut self, outcome: &AggregateOutcome, duration_ms: f64) {
        match outcome.classification {
            Classification::AllSucceeded => self.all_succeeded += 1,
            Classification::PartialFailure => self.partial_failure += 1,
            Classification::AllFailed => self.all_failed += 1,
        }
        self.recipients_succeeded += outcome.success_count() as u64;
        self.recipients_failed += outcome.failure_count() as u64;
        self.duration_stats.push(duration_ms);
    }

    /// Add one malformed unit
    pub fn record_malformed(&mut self) {
        self.malformed += 1;
    }

    /// Envelopes dispatched, malformed units excluded
    pub fn dispatched(&self) -> u64 {
        self.all_succeeded + self.partial_failure + self.all_failed
    }

    pub fn summary(&self) -> OutcomeSummary {
        let recipients = self.recipients_succeeded + self.recipients_failed;
        OutcomeSummary {
            units: self.dispatched() + self.malformed,
            dispatched: self.dispatched(),
            malformed: self.malformed,
            all_succeeded: self.all_succeeded,
            partial_failure: self.partial_failure,
            all_failed: self.all_failed,
            recipients,
            recipients_failed: self.recipients_failed,
            recipient_failure_rate: if recipients > 0 {
                self.recipients_failed as f64 / recipients as f64 * 100.0
            } else {
                0.0
            },
            duration_ms: StatsSummary::from(&self.duration_stats),
        }
    }
}

/// Outcome summary
#[derive(Debug, Clone, Default)]
pub struct OutcomeSummary {
    pub units: u64,
    pub dispatched: u64,
    pub malformed: u64,
    pub all_succeeded: u64,
    pub partial_failure: u64,
    pub all_failed: u64,
    pub recipients: u64,
    pub recipients_failed: u64,
    pub recipient_failure_rate: f64,
    pub duration_ms: StatsSummary,
}

impl std::fmt::Display for OutcomeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Summary ===")?;
        writeln!(f, "Units: {} ({} malformed)", self.units, self.malformed)?;
        writeln!(f, "Envelopes dispatched: {}", self.dispatched)?;
        writeln!(f, "  all succeeded: {}", self.all_succeeded)?;
        writeln!(f, "  partial failure: {}", self.partial_failure)?;
        writeln!(f, "  all failed: {}", self.all_failed)?;
        writeln!(
            f,
            "Recipients: {} ({} failed, {:.2}%)",
            self.recipients, self.recipients_failed, self.recipient_failure_rate
        )?;
        writeln!(f, "Envelope duration (ms): {}", self.duration_ms)?;
        Ok(())
    }
}

/// Summary of a [`RunningStats`]
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.1}, std={:.1} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online mean/variance (Welford)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

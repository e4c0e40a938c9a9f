//! Pipeline statistics and metrics.

use std::time::Duration;

use dispatcher::MetricsSnapshot;
use observability::OutcomeStatsAggregator;

use super::WriterStats;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Non-empty input lines read
    pub units_read: u64,

    /// Whether reading stopped early on a shutdown signal
    pub interrupted: bool,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Outcome tally
    pub outcomes: OutcomeStatsAggregator,

    /// Dispatcher counters at the end of the run
    pub dispatch: MetricsSnapshot,

    /// Records written per route
    pub written: WriterStats,
}

impl PipelineStats {
    /// Envelopes per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.outcomes.dispatched() as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!();
        print!("{}", self.outcomes.summary());
        println!("Duration: {:.2}s ({:.2} envelopes/s)", self.duration.as_secs_f64(), self.throughput());
        println!(
            "Gateway calls: {} ({} failed)",
            self.dispatch.gateway_calls(),
            self.dispatch.gateway_failures
        );
        println!(
            "Rate limit: {} permits granted, {} timed out",
            self.dispatch.permits_granted, self.dispatch.permits_timed_out
        );
        println!(
            "Routed: {} success, {} failure",
            self.written.success, self.written.failure
        );
        if self.interrupted {
            println!("Run interrupted before the end of input");
        }
        println!();
    }
}

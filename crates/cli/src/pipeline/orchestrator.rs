//! Pipeline orchestrator - reads units, dispatches envelopes, routes outcomes.
//!
//! Every worker shares one dispatcher, and with it one gateway and one rate
//! limiter, so the limit holds across all in-flight envelopes.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use contracts::{GatewayClient, NotifierBlueprint, RoutingConfig};
use dispatcher::{AnyGateway, Dispatcher, DispatcherBuilder, EnvelopeParser};
use observability::{record_envelope, record_malformed_envelope};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::{OutcomeRecord, OutcomeWriter, PipelineStats};
use crate::error::CliError;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated configuration
    pub blueprint: NotifierBlueprint,

    /// JSON-lines input
    pub input: PathBuf,

    /// Directory for the route files
    pub output_dir: PathBuf,

    /// Maximum number of units to process (None = unlimited)
    pub max_units: Option<u64>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

/// Result of one dispatched envelope
struct Completed {
    outcome: contracts::AggregateOutcome,
    duration_ms: f64,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run with the configured gateway until the input ends or `shutdown`
    /// resolves
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<PipelineStats> {
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let gateway = AnyGateway::from_config(&self.config.blueprint.gateway)
            .await
            .context("Failed to create gateway")?;
        self.run_with_gateway(Arc::new(gateway), shutdown).await
    }

    /// Run with a caller-provided gateway
    ///
    /// On shutdown no new unit is read; envelopes already in flight finish
    /// and their records are written before returning.
    pub async fn run_with_gateway<G>(
        self,
        gateway: Arc<G>,
        shutdown: impl Future<Output = ()>,
    ) -> Result<PipelineStats>
    where
        G: GatewayClient + Send + Sync + 'static,
    {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        if !self.config.input.exists() {
            return Err(CliError::input_not_found(&self.config.input).into());
        }

        let dispatcher = DispatcherBuilder::new(gateway)
            .rate_limit(&blueprint.rate_limit)
            .build()
            .context("Failed to build dispatcher")?;

        let writer = OutcomeWriter::spawn(&self.config.output_dir, blueprint.pipeline.queue_capacity)
            .await?;
        let records = writer.sender();

        let input = File::open(&self.config.input)
            .await
            .with_context(|| format!("Failed to open input {}", self.config.input.display()))?;
        let mut lines = BufReader::new(input).lines();

        let workers = Arc::new(Semaphore::new(blueprint.pipeline.workers));
        let mut tasks: JoinSet<Completed> = JoinSet::new();
        let mut stats = PipelineStats::default();
        let mut line_no = 0u64;

        info!(
            input = %self.config.input.display(),
            output = %self.config.output_dir.display(),
            workers = blueprint.pipeline.workers,
            rate_limited = dispatcher.limiter().is_some(),
            "Pipeline running"
        );

        tokio::pin!(shutdown);

        loop {
            if let Some(max) = self.config.max_units {
                if stats.units_read >= max {
                    info!(units = stats.units_read, "Reached max units limit");
                    break;
                }
            }

            let next = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("Shutdown requested, finishing in-flight envelopes");
                    stats.interrupted = true;
                    break;
                }
                next = lines.next_line() => next.context("Failed to read input")?,
            };
            let Some(raw) = next else { break };
            line_no += 1;

            if raw.trim().is_empty() {
                continue;
            }
            stats.units_read += 1;

            while let Some(done) = tasks.try_join_next() {
                record_completed(&mut stats, done.context("Dispatch task panicked")?);
            }

            match EnvelopeParser::parse_str(&raw) {
                Err(e) => {
                    let reason = e.failure_reason();
                    warn!(line = line_no, reason = %reason, "Malformed unit routed to failure");
                    record_malformed_envelope();
                    stats.outcomes.record_malformed();
                    send_record(&records, OutcomeRecord::malformed(line_no, raw, reason)).await;
                }
                Ok(envelope) => {
                    let permit = tokio::select! {
                        biased;
                        _ = &mut shutdown => {
                            warn!(line = line_no, "Shutdown requested, unit left undispatched");
                            stats.units_read -= 1;
                            stats.interrupted = true;
                            break;
                        }
                        permit = Arc::clone(&workers).acquire_owned() => {
                            permit.context("Worker pool closed")?
                        }
                    };
                    let task = DispatchTask {
                        dispatcher: dispatcher.clone(),
                        routing: blueprint.routing.clone(),
                        records: records.clone(),
                        line: line_no,
                        raw,
                    };
                    tasks.spawn(async move {
                        let _permit = permit;
                        task.run(envelope).await
                    });
                }
            }
        }

        while let Some(done) = tasks.join_next().await {
            record_completed(&mut stats, done.context("Dispatch task panicked")?);
        }

        drop(records);
        stats.written = writer.shutdown().await?;
        stats.dispatch = dispatcher.metrics();
        stats.duration = start_time.elapsed();

        info!(
            units = stats.units_read,
            dispatched = stats.outcomes.dispatched(),
            malformed = stats.outcomes.malformed,
            duration_secs = stats.duration.as_secs_f64(),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}

/// Everything one worker needs to dispatch and route an envelope
struct DispatchTask<G> {
    dispatcher: Dispatcher<G>,
    routing: RoutingConfig,
    records: mpsc::Sender<OutcomeRecord>,
    line: u64,
    raw: String,
}

impl<G: GatewayClient> DispatchTask<G> {
    async fn run(self, envelope: contracts::Envelope) -> Completed {
        let started = Instant::now();
        let outcome = self.dispatcher.dispatch_and_aggregate(&envelope).await;
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        record_envelope(outcome.classification, duration_ms);
        let route = self.routing.route(outcome.classification);
        debug!(
            line = self.line,
            classification = %outcome.classification,
            route = route.as_str(),
            "Envelope routed"
        );

        send_record(
            &self.records,
            OutcomeRecord::dispatched(self.line, self.raw, route, &outcome),
        )
        .await;

        Completed {
            outcome,
            duration_ms,
        }
    }
}

async fn send_record(records: &mpsc::Sender<OutcomeRecord>, record: OutcomeRecord) {
    let line = record.line;
    if records.send(record).await.is_err() {
        warn!(line, "Outcome writer closed, record lost");
    }
}

fn record_completed(stats: &mut PipelineStats, done: Completed) {
    stats.outcomes.update(&done.outcome, done.duration_ms);
}

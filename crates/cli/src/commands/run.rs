//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::NotifierBlueprint;
use tracing::{info, warn};

use super::load_blueprint;
use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig, FAILURE_FILE, SUCCESS_FILE};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    let mut blueprint = load_blueprint(&args.config)?;

    // Apply CLI overrides
    if let Some(workers) = args.workers {
        info!(workers, "Overriding worker count from CLI");
        blueprint.pipeline.workers = workers;
    }
    if args.no_rate_limit {
        warn!("Rate limiting disabled from CLI");
        blueprint.rate_limit.enabled = false;
    }
    config_loader::ConfigLoader::validate(&blueprint)
        .map_err(|e| CliError::config_validation(e.to_string()))?;

    info!(
        gateway = %blueprint.gateway.name,
        kind = ?blueprint.gateway.kind,
        limit_for_period = blueprint.rate_limit.limit_for_period,
        refresh_period_ms = blueprint.rate_limit.refresh_period_ms,
        rate_limited = blueprint.rate_limit.enabled,
        workers = blueprint.pipeline.workers,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let pipeline = Pipeline::new(PipelineConfig {
        blueprint,
        input: args.input.clone(),
        output_dir: args.output.clone(),
        max_units: (args.max_units > 0).then_some(args.max_units),
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
    });

    info!("Starting pipeline...");

    let stats = pipeline
        .run(shutdown_signal())
        .await
        .context("Pipeline execution failed")?;

    info!(
        dispatched = stats.outcomes.dispatched(),
        malformed = stats.outcomes.malformed,
        duration_secs = stats.duration.as_secs_f64(),
        throughput = format!("{:.2}", stats.throughput()),
        "Pipeline completed"
    );

    stats.print_summary();
    println!(
        "Outcomes: {} / {}",
        args.output.join(SUCCESS_FILE).display(),
        args.output.join(FAILURE_FILE).display()
    );

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
///
/// A handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &NotifierBlueprint) {
    let rate = &blueprint.rate_limit;

    println!("\n=== Configuration Summary ===\n");
    println!("Gateway: {} ({:?})", blueprint.gateway.name, blueprint.gateway.kind);
    if rate.enabled {
        println!(
            "Rate limit: {} per {} ms, acquire timeout {} ms",
            rate.limit_for_period, rate.refresh_period_ms, rate.acquire_timeout_ms
        );
    } else {
        println!("Rate limit: disabled");
    }
    println!(
        "Routing: partial_failure -> {}, all_failed -> {}",
        blueprint.routing.partial_failure.as_str(),
        blueprint.routing.all_failed.as_str()
    );
    println!("Workers: {}", blueprint.pipeline.workers);
    println!();
}

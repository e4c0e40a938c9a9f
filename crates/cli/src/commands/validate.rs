//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{GatewayKind, NotifierBlueprint, Route};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;
use crate::error::CliError;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    gateway: String,
    gateway_kind: GatewayKind,
    rate_limited: bool,
    max_sends_per_second: f64,
    workers: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    match result.error {
        None => Ok(()),
        Some(error) => Err(CliError::config_validation(error).into()),
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            error: Some(format!("File not found: {config_path}")),
            config_path,
            warnings: Vec::new(),
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => ValidationResult {
            valid: true,
            config_path,
            error: None,
            warnings: collect_warnings(&blueprint),
            summary: Some(summarize(&blueprint)),
        },
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: Vec::new(),
            summary: None,
        },
    }
}

fn summarize(blueprint: &NotifierBlueprint) -> ConfigSummary {
    let rate = &blueprint.rate_limit;
    ConfigSummary {
        version: format!("{:?}", blueprint.version),
        gateway: blueprint.gateway.name.clone(),
        gateway_kind: blueprint.gateway.kind,
        rate_limited: rate.enabled,
        max_sends_per_second: rate.limit_for_period as f64 * 1000.0
            / rate.refresh_period_ms as f64,
        workers: blueprint.pipeline.workers,
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &NotifierBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();
    let rate = &blueprint.rate_limit;

    if !rate.enabled {
        warnings.push(
            "rate limiting disabled - gateway calls are not throttled".to_string(),
        );
    } else if rate.acquire_timeout_ms < rate.refresh_period_ms {
        warnings.push(format!(
            "rate_limit.acquire_timeout_ms ({}) is shorter than refresh_period_ms ({}) - \
             sends beyond the first window will time out",
            rate.acquire_timeout_ms, rate.refresh_period_ms
        ));
    }

    if blueprint.gateway.kind == GatewayKind::Mock {
        warnings.push("mock gateway configured - no message will be delivered".to_string());
    }

    if blueprint.routing.all_failed == Route::Success {
        warnings.push("routing.all_failed = success - fully failed envelopes are routed to success".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Gateway: {} ({:?})", summary.gateway, summary.gateway_kind);
            if summary.rate_limited {
                println!("  Max sends/s: {:.2}", summary.max_sends_per_second);
            }
            println!("  Workers: {}", summary.workers);
        }

        if !result.warnings.is_empty() {
            println!("\n⚠ Warnings:");
            for warning in &result.warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

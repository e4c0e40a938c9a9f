//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{Classification, GatewayKind, NotifierBlueprint, Route};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use super::load_blueprint;
use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    rate_limit: RateLimitInfo,
    gateway: GatewayInfo,
    routing: BTreeMap<&'static str, Route>,
    workers: usize,
    queue_capacity: usize,
}

#[derive(Serialize)]
struct RateLimitInfo {
    enabled: bool,
    limit_for_period: u32,
    refresh_period_ms: u64,
    acquire_timeout_ms: u64,
}

#[derive(Serialize)]
struct GatewayInfo {
    name: String,
    kind: GatewayKind,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    params: BTreeMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let blueprint = load_blueprint(&args.config)?;
    let info = build_config_info(&blueprint);

    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(blueprint: &NotifierBlueprint) -> ConfigInfo {
    let rate = &blueprint.rate_limit;
    let routing = [
        Classification::AllSucceeded,
        Classification::PartialFailure,
        Classification::AllFailed,
    ]
    .into_iter()
    .map(|c| (c.as_str(), blueprint.routing.route(c)))
    .collect();

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        rate_limit: RateLimitInfo {
            enabled: rate.enabled,
            limit_for_period: rate.limit_for_period,
            refresh_period_ms: rate.refresh_period_ms,
            acquire_timeout_ms: rate.acquire_timeout_ms,
        },
        gateway: GatewayInfo {
            name: blueprint.gateway.name.clone(),
            kind: blueprint.gateway.kind,
            params: blueprint
                .gateway
                .params
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        },
        routing,
        workers: blueprint.pipeline.workers,
        queue_capacity: blueprint.pipeline.queue_capacity,
    }
}

fn print_config_info(info: &ConfigInfo) {
    println!("=== Notifier Configuration ({}) ===\n", info.version);

    let rate = &info.rate_limit;
    println!("Rate limit");
    if rate.enabled {
        println!("   ├─ Limit: {} per {} ms", rate.limit_for_period, rate.refresh_period_ms);
        println!("   └─ Acquire timeout: {} ms", rate.acquire_timeout_ms);
    } else {
        println!("   └─ Disabled");
    }

    println!("\nGateway");
    println!("   ├─ Name: {}", info.gateway.name);
    if info.gateway.params.is_empty() {
        println!("   └─ Kind: {:?}", info.gateway.kind);
    } else {
        println!("   ├─ Kind: {:?}", info.gateway.kind);
        let last = info.gateway.params.len() - 1;
        for (i, (key, value)) in info.gateway.params.iter().enumerate() {
            let prefix = if i == last { "└─" } else { "├─" };
            println!("   {} {}: {}", prefix, key, value);
        }
    }

    println!("\nRouting");
    let last = info.routing.len().saturating_sub(1);
    for (i, (classification, route)) in info.routing.iter().enumerate() {
        let prefix = if i == last { "└─" } else { "├─" };
        println!("   {} {} -> {}", prefix, classification, route.as_str());
    }

    println!("\nPipeline");
    println!("   ├─ Workers: {}", info.workers);
    println!("   └─ Queue capacity: {}", info.queue_capacity);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_lists_every_classification() {
        let info = build_config_info(&NotifierBlueprint::default());
        assert_eq!(info.routing.len(), 3);
        assert_eq!(info.routing["all_failed"], Route::Failure);
        assert_eq!(info.routing["partial_failure"], Route::Success);

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["rate_limit"]["limit_for_period"], 18);
        assert_eq!(json["gateway"]["kind"], "log");
    }
}

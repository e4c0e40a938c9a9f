//! `check` command implementation.
//!
//! Parses every unit of an input file without dispatching anything.

use anyhow::{Context, Result};
use dispatcher::EnvelopeParser;
use serde::Serialize;
use tracing::info;

use crate::cli::CheckArgs;
use crate::error::CliError;

/// Check report for JSON output
#[derive(Debug, Serialize)]
struct CheckReport {
    input: String,
    units: u64,
    envelopes: u64,
    recipients: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    malformed: Vec<MalformedUnit>,
}

#[derive(Debug, Serialize)]
struct MalformedUnit {
    line: u64,
    reason: String,
}

/// Execute the `check` command
pub fn run_check(args: &CheckArgs) -> Result<()> {
    info!(input = %args.input.display(), "Checking envelopes");

    if !args.input.exists() {
        return Err(CliError::input_not_found(&args.input).into());
    }
    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let report = check_units(&args.input.display().to_string(), &content);

    if args.json {
        let json =
            serde_json::to_string_pretty(&report).context("Failed to serialize check report")?;
        println!("{}", json);
    } else {
        print_report(&report);
    }

    if report.malformed.is_empty() {
        Ok(())
    } else {
        Err(CliError::MalformedInput {
            units: report.units,
            malformed: report.malformed.len() as u64,
        }
        .into())
    }
}

fn check_units(input: &str, content: &str) -> CheckReport {
    let mut report = CheckReport {
        input: input.to_string(),
        units: 0,
        envelopes: 0,
        recipients: 0,
        malformed: Vec::new(),
    };

    for (idx, raw) in content.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        report.units += 1;

        match EnvelopeParser::parse_str(raw) {
            Ok(envelope) => {
                report.envelopes += 1;
                report.recipients += envelope.len() as u64;
            }
            Err(e) => report.malformed.push(MalformedUnit {
                line: idx as u64 + 1,
                reason: e.failure_reason(),
            }),
        }
    }

    report
}

fn print_report(report: &CheckReport) {
    if report.malformed.is_empty() {
        println!("✓ All {} units are valid envelopes: {}", report.units, report.input);
    } else {
        println!(
            "✗ {} of {} units are malformed: {}",
            report.malformed.len(),
            report.units,
            report.input
        );
        for unit in &report.malformed {
            println!("  line {}: {}", unit.line, unit.reason);
        }
    }
    println!(
        "\n  Envelopes: {}\n  Recipients: {}",
        report.envelopes, report.recipients
    );
}

//! Per-unit outcome records written by the pipeline.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use contracts::{AggregateOutcome, Classification, Route, ATTR_ERROR};
use serde::{Deserialize, Serialize};

/// One processed input unit
///
/// `content` is the original line, unchanged; `attributes` carries the
/// `status.*` keys next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// 1-based line number in the input file
    pub line: u64,
    pub route: Route,
    /// Absent for malformed units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    pub attributes: BTreeMap<String, String>,
    pub content: String,
    pub processed_at: String,
}

impl OutcomeRecord {
    /// Record for a dispatched envelope
    pub fn dispatched(line: u64, content: String, route: Route, outcome: &AggregateOutcome) -> Self {
        Self {
            line,
            route,
            classification: Some(outcome.classification),
            attributes: outcome.attributes.clone(),
            content,
            processed_at: now(),
        }
    }

    /// Record for a unit that failed to parse; always routed to failure
    pub fn malformed(line: u64, content: String, reason: impl Into<String>) -> Self {
        Self {
            line,
            route: Route::Failure,
            classification: None,
            attributes: BTreeMap::from([(ATTR_ERROR.to_string(), reason.into())]),
            content,
            processed_at: now(),
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

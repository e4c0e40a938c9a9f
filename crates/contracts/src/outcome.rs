//! Per-recipient results and the envelope-level outcome derived from them

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::RecipientId;

/// Attribute key prefix for per-recipient status and counters
pub const STATUS_PREFIX: &str = "status.";

/// Attribute key holding the number of successful recipients
pub const ATTR_COUNT_SUCCESS: &str = "status.count.success";

/// Attribute key holding the number of failed recipients
pub const ATTR_COUNT_FAILURE: &str = "status.count.failure";

/// Attribute key holding the parse error of a malformed unit
pub const ATTR_ERROR: &str = "status.error";

/// Failure reason recorded when no permit was issued in time
pub const RATE_LIMIT_TIMEOUT_REASON: &str = "rate limit timeout";

/// Result of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// Gateway accepted the message
    Success { gateway_id: String },
    /// Admission or gateway failure
    Failure { reason: String },
}

impl DeliveryOutcome {
    /// Whether the attempt succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Gateway id on success, failure reason otherwise
    pub fn detail(&self) -> &str {
        match self {
            Self::Success { gateway_id } => gateway_id,
            Self::Failure { reason } => reason,
        }
    }
}

/// Outcome for a single recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
    pub recipient: RecipientId,
    #[serde(flatten)]
    pub outcome: DeliveryOutcome,
}

impl DispatchResult {
    /// Successful delivery
    pub fn success(recipient: RecipientId, gateway_id: impl Into<String>) -> Self {
        Self {
            recipient,
            outcome: DeliveryOutcome::Success {
                gateway_id: gateway_id.into(),
            },
        }
    }

    /// Failed delivery
    pub fn failure(recipient: RecipientId, reason: impl Into<String>) -> Self {
        Self {
            recipient,
            outcome: DeliveryOutcome::Failure {
                reason: reason.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// Attribute key for this recipient, `status.<recipient>`
    pub fn attribute_key(&self) -> String {
        format!("{STATUS_PREFIX}{}", self.recipient)
    }
}

/// Envelope-level classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    AllSucceeded,
    PartialFailure,
    AllFailed,
}

impl Classification {
    /// Stable label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllSucceeded => "all_succeeded",
            Self::PartialFailure => "partial_failure",
            Self::AllFailed => "all_failed",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate outcome of one envelope, owned by the caller once returned
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateOutcome {
    /// Results in envelope recipient order
    pub per_recipient: Vec<DispatchResult>,
    pub classification: Classification,
    /// Flat attribute set, see [`STATUS_PREFIX`]
    pub attributes: BTreeMap<String, String>,
}

impl AggregateOutcome {
    /// Number of successful recipients
    pub fn success_count(&self) -> usize {
        self.per_recipient.iter().filter(|r| r.is_success()).count()
    }

    /// Number of failed recipients
    pub fn failure_count(&self) -> usize {
        self.per_recipient.len() - self.success_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_detail() {
        let ok = DispatchResult::success("+1A".into(), "msg-1");
        let bad = DispatchResult::failure("+1B".into(), "rejected");
        assert_eq!(ok.outcome.detail(), "msg-1");
        assert_eq!(bad.outcome.detail(), "rejected");
        assert_eq!(bad.attribute_key(), "status.+1B");
    }

    #[test]
    fn test_dispatch_result_json_shape() {
        let ok = DispatchResult::success("+1A".into(), "msg-1");
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["recipient"], "+1A");
        assert_eq!(json["status"], "success");
        assert_eq!(json["gateway_id"], "msg-1");
    }

    #[test]
    fn test_classification_labels() {
        assert_eq!(Classification::PartialFailure.to_string(), "partial_failure");
        let json = serde_json::to_string(&Classification::AllFailed).unwrap();
        assert_eq!(json, "\"all_failed\"");
    }
}
